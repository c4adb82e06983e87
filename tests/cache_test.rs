use showhn_engine::config::MIN_USABLE_IMAGE_BYTES;
use showhn_engine::engine::cache::ThumbCache;

#[test]
fn test_usable_png_threshold() {
    let dir = tempfile::tempdir().unwrap();
    let cache = ThumbCache::new(dir.path()).unwrap();

    // Nothing cached yet.
    assert!(cache.usable_png("42").is_none());

    // A short file is a token or a truncated write, not a screenshot.
    std::fs::write(cache.png_path("42"), vec![0xAB; 50]).unwrap();
    assert!(cache.usable_png("42").is_none());

    std::fs::write(
        cache.png_path("42"),
        vec![0xAB; MIN_USABLE_IMAGE_BYTES as usize],
    )
    .unwrap();
    assert_eq!(cache.usable_png("42"), Some(cache.png_path("42")));
}

#[test]
fn test_legacy_jpg_counts_on_existence() {
    let dir = tempfile::tempdir().unwrap();
    let cache = ThumbCache::new(dir.path()).unwrap();

    assert!(cache.legacy_jpg("7").is_none());

    // Legacy entries are served regardless of size, no migration.
    std::fs::write(cache.jpg_path("7"), vec![0xCD; 10]).unwrap();
    assert_eq!(cache.legacy_jpg("7"), Some(cache.jpg_path("7")));
}

#[test]
fn test_token_reserve_and_commit() {
    let dir = tempfile::tempdir().unwrap();
    let cache = ThumbCache::new(dir.path()).unwrap();

    let token = cache.mint_token();
    cache.write_token("9", &token).unwrap();

    assert_eq!(cache.read_token("9"), Some(token.clone()));
    assert!(cache.token_is_current("9", &token));
    // The token file itself must read back as a miss.
    assert!(cache.usable_png("9").is_none());

    let image = vec![0xEF; 256];
    assert!(cache.commit("9", &token, &image).unwrap());
    assert_eq!(cache.usable_png("9"), Some(cache.png_path("9")));
    assert_eq!(std::fs::read(cache.png_path("9")).unwrap(), image);

    // Once a real image landed there is no token any more.
    assert_eq!(cache.read_token("9"), None);
}

#[test]
fn test_commit_rejects_stale_token() {
    let dir = tempfile::tempdir().unwrap();
    let cache = ThumbCache::new(dir.path()).unwrap();

    let first = cache.mint_token();
    let second = cache.mint_token();
    assert_ne!(first, second);

    cache.write_token("3", &second).unwrap();

    // The superseded writer must not land.
    assert!(!cache.commit("3", &first, &[0xAA; 256]).unwrap());
    assert_eq!(cache.read_token("3"), Some(second.clone()));

    assert!(cache.commit("3", &second, &[0xBB; 256]).unwrap());
    assert_eq!(std::fs::read(cache.png_path("3")).unwrap(), vec![0xBB; 256]);
}

#[test]
fn test_mint_token_unique_and_short() {
    let dir = tempfile::tempdir().unwrap();
    let cache = ThumbCache::new(dir.path()).unwrap();

    let tokens: Vec<String> = (0..100).map(|_| cache.mint_token()).collect();
    for token in &tokens {
        // Tokens must stay below the usability threshold.
        assert!((token.len() as u64) < MIN_USABLE_IMAGE_BYTES);
    }

    let unique: std::collections::HashSet<&String> = tokens.iter().collect();
    assert_eq!(unique.len(), tokens.len());
}
