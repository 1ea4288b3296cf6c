use image::RgbImage;
use std::fs;
use tempfile::tempdir;
use thumbfit::cache::CacheStore;
use thumbfit::codec::PngCodec;
use thumbfit::pipeline::{BatchConfig, BatchProcessor};
use thumbfit::scanner::{discover_thumbnails, DiscoveryConfig};

#[test]
fn test_scan_then_batch_over_workshop_mods() {
    let workshop = tempdir().unwrap();
    let local = tempdir().unwrap();

    for name in ["alpha", "beta"] {
        let dir = workshop.path().join(name);
        fs::create_dir_all(&dir).unwrap();
        RgbImage::new(30, 30).save(dir.join("thumbnail.png")).unwrap();
    }
    fs::create_dir_all(workshop.path().join("no_thumb")).unwrap();

    let local_mod = local.path().join("dev_mod");
    fs::create_dir_all(&local_mod).unwrap();
    RgbImage::new(30, 30)
        .save(local_mod.join("thumbnail.png"))
        .unwrap();

    let paths = discover_thumbnails(&DiscoveryConfig {
        workshop_roots: vec![workshop.path().to_path_buf()],
        local_roots: vec![local.path().to_path_buf()],
        ..Default::default()
    });
    assert_eq!(paths.len(), 2);

    let store = CacheStore::empty(workshop.path().join("cache.json"));
    let processor = BatchProcessor::new(
        PngCodec::new(),
        BatchConfig::default().with_target(16, 9).with_threads(2),
    );
    let summary = processor.process_batch(&store, &paths);
    assert_eq!(summary.resized, 2);

    // local thumbnail left alone
    let local_image = image::open(local_mod.join("thumbnail.png")).unwrap();
    assert_eq!((local_image.width(), local_image.height()), (30, 30));
}
