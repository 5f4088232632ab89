//! BlurHash Demo - encode an image file and render its placeholder
//!
//! Run with: cargo run --example demo -- path/to/image.jpg

use std::time::{Duration, Instant};

use lazy_blurhash::{
    BlurHash, BlurHashService, CachedBlurHash, EncodedSignature, MemoryCache,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let Some(path) = std::env::args().nth(1) else {
        eprintln!("usage: demo <image>");
        std::process::exit(2);
    };

    println!("=== BlurHash Demo ===\n");

    let service = CachedBlurHash::new(
        BlurHash::default(),
        MemoryCache::new(),
        Some(Duration::from_secs(60)),
    );

    let started = Instant::now();
    let hash = service.encode_default(&path)?;
    println!("1. Encoded {path} in {:?}", started.elapsed());
    println!("   BlurHash: {hash}");

    let signature: EncodedSignature = hash.parse()?;
    let (cx, cy) = signature.components();
    println!("   Components: {cx}x{cy}, average color {:?}\n", signature.average_color());

    let started = Instant::now();
    service.encode_default(&path)?;
    println!("2. Second encode served from cache in {:?}\n", started.elapsed());

    let uri = service.create_data_uri_thumbnail_default(&path, 32, 24)?;
    println!("3. 32x24 placeholder ({} bytes):", uri.len());
    println!("   {uri}");

    Ok(())
}
