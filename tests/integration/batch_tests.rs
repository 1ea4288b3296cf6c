use filetime::{set_file_mtime, FileTime};
use image::{Rgb, RgbImage};
use std::path::{Path, PathBuf};
use tempfile::{tempdir, TempDir};
use thumbfit::cache::CacheStore;
use thumbfit::codec::{ImageCodec, PngCodec};
use thumbfit::pipeline::{BatchConfig, BatchProcessor};

fn write_png(dir: &Path, name: &str, width: u32, height: u32, shade: u8) -> PathBuf {
    let path = dir.join(name);
    RgbImage::from_pixel(width, height, Rgb([shade, 0, 0]))
        .save(&path)
        .unwrap();
    path
}

fn dimensions(path: &Path) -> (u32, u32) {
    let codec = PngCodec::new();
    codec.dimensions(&codec.decode(path).unwrap())
}

fn processor() -> BatchProcessor<PngCodec> {
    BatchProcessor::new(
        PngCodec::new(),
        BatchConfig::default().with_target(40, 20).with_threads(2),
    )
}

fn setup() -> (TempDir, PathBuf) {
    let dir = tempdir().unwrap();
    let cache = dir.path().join("textureCache.json");
    (dir, cache)
}

#[test]
fn test_first_run_resizes_and_persists_cache() {
    let (dir, cache_path) = setup();
    let big = write_png(dir.path(), "big.png", 80, 80, 10);
    let sized = write_png(dir.path(), "sized.png", 40, 20, 20);

    let store = CacheStore::load(&cache_path);
    let summary = processor().process_batch(&store, &[big.clone(), sized.clone()]);

    assert_eq!(summary.resized, 1);
    assert_eq!(summary.already_sized, 1);
    assert!(summary.cache_saved);
    assert_eq!(dimensions(&big), (40, 20));
    assert_eq!(dimensions(&sized), (40, 20));

    let reloaded = CacheStore::try_load(&cache_path).unwrap();
    assert_eq!(reloaded.len(), 2);
    assert!(reloaded.get(&big).is_some());
}

#[test]
fn test_second_run_over_unchanged_files_is_a_no_op() {
    let (dir, cache_path) = setup();
    let paths: Vec<_> = (0..5)
        .map(|i| write_png(dir.path(), &format!("{i}.png"), 60, 60, i as u8))
        .collect();

    let store = CacheStore::load(&cache_path);
    let first = processor().process_batch(&store, &paths);
    assert_eq!(first.resized, 5);

    let modified_before = std::fs::metadata(&cache_path).unwrap().modified().unwrap();

    // fresh process: reload from disk
    let store = CacheStore::load(&cache_path);
    let second = processor().process_batch(&store, &paths);

    assert_eq!(second.unchanged, 5);
    assert_eq!(second.resized + second.already_sized, 0);
    assert!(!second.cache_saved);
    assert_eq!(
        std::fs::metadata(&cache_path).unwrap().modified().unwrap(),
        modified_before
    );
}

#[test]
fn test_replaced_image_is_processed_again() {
    let (dir, cache_path) = setup();
    let path = write_png(dir.path(), "thumbnail.png", 60, 60, 1);

    let store = CacheStore::load(&cache_path);
    processor().process_batch(&store, &[path.clone()]);

    // mod update ships a new, larger thumbnail
    write_png(dir.path(), "thumbnail.png", 100, 50, 2);
    set_file_mtime(&path, FileTime::from_unix_time(2_000_000_000, 0)).unwrap();

    let summary = processor().process_batch(&store, &[path.clone()]);
    assert_eq!(summary.resized, 1);
    assert_eq!(dimensions(&path), (40, 20));
}

#[test]
fn test_touched_image_is_not_decoded() {
    let (dir, cache_path) = setup();
    let path = write_png(dir.path(), "thumbnail.png", 40, 20, 1);

    let store = CacheStore::load(&cache_path);
    processor().process_batch(&store, &[path.clone()]);
    let entry = store.get(&path).unwrap();

    set_file_mtime(&path, FileTime::from_unix_time(1_500_000_000, 0)).unwrap();
    let summary = processor().process_batch(&store, &[path.clone()]);

    assert_eq!(summary.unchanged, 1);
    // the refreshed meta hash is worth saving
    assert!(summary.cache_saved);
    let updated = store.get(&path).unwrap();
    assert_eq!(updated.content_hash, entry.content_hash);
    assert_ne!(updated.meta_hash, entry.meta_hash);
}

#[test]
fn test_corrupt_image_does_not_stop_batch() {
    let (dir, cache_path) = setup();
    let broken = dir.path().join("broken.png");
    std::fs::write(&broken, b"\x89PNG but not really").unwrap();
    let good = write_png(dir.path(), "good.png", 64, 64, 3);

    let store = CacheStore::load(&cache_path);
    let summary = processor().process_batch(&store, &[broken.clone(), good.clone()]);

    assert_eq!(summary.failed, 1);
    assert_eq!(summary.resized, 1);
    assert_eq!(dimensions(&good), (40, 20));
    assert_eq!(std::fs::read(&broken).unwrap(), b"\x89PNG but not really");
}

#[test]
fn test_duplicate_paths_are_processed_independently() {
    let (dir, cache_path) = setup();
    let path = write_png(dir.path(), "dup.png", 40, 20, 4);

    let store = CacheStore::load(&cache_path);
    let summary = processor().process_batch(&store, &[path.clone(), path.clone(), path]);

    assert_eq!(summary.total, 3);
    assert_eq!(summary.failed, 0);
    assert_eq!(store.len(), 1);
}

#[test]
fn test_bmp_thumbnail_is_rewritten_as_bmp() {
    let (dir, cache_path) = setup();
    let path = dir.path().join("thumbnail.bmp");
    RgbImage::from_pixel(80, 80, Rgb([0, 0, 200]))
        .save(&path)
        .unwrap();

    let store = CacheStore::load(&cache_path);
    let summary = processor().process_batch(&store, &[path.clone()]);
    assert_eq!(summary.resized, 1);

    let bytes = std::fs::read(&path).unwrap();
    assert_eq!(&bytes[..2], b"BM");
    assert_eq!(
        image::guess_format(&bytes).unwrap(),
        image::ImageFormat::Bmp
    );
    let reopened = image::open(&path).unwrap();
    assert_eq!((reopened.width(), reopened.height()), (40, 20));

    let second = processor().process_batch(&store, &[path]);
    assert_eq!(second.unchanged, 1);
}
