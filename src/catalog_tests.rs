//! Tests for channel catalog persistence and filtering

#[cfg(test)]
mod tests {
    use crate::catalog::*;
    use tempfile::TempDir;

    fn sample_catalog(dir: &TempDir) -> Catalog {
        let mut catalog = Catalog::empty(dir.path().join("channels.json"));
        catalog.add("BBC", "http://a").unwrap();
        catalog.add("CBC", "http://b").unwrap();
        catalog.add("France 24", "http://c").unwrap();
        catalog
    }

    #[test]
    fn test_filter_empty_query_returns_all_in_order() {
        let dir = TempDir::new().unwrap();
        let catalog = sample_catalog(&dir);
        let view = catalog.filter("");
        assert_eq!(view.len(), 3);
        assert_eq!(view[0].name, "BBC");
        assert_eq!(view[1].name, "CBC");
        assert_eq!(view[2].name, "France 24");
    }

    #[test]
    fn test_filter_is_case_insensitive() {
        let dir = TempDir::new().unwrap();
        let catalog = sample_catalog(&dir);
        // "bc" matches both "BBC" and "CBC", original order kept
        let view = catalog.filter("bc");
        assert_eq!(view.len(), 2);
        assert_eq!(view[0].name, "BBC");
        assert_eq!(view[1].name, "CBC");

        let view = catalog.filter("FRANCE");
        assert_eq!(view.len(), 1);
        assert_eq!(view[0].url, "http://c");
    }

    #[test]
    fn test_filter_no_match_is_empty_not_error() {
        let dir = TempDir::new().unwrap();
        let catalog = sample_catalog(&dir);
        assert!(catalog.filter("xyz").is_empty());
    }

    #[test]
    fn test_filter_does_not_mutate_catalog() {
        let dir = TempDir::new().unwrap();
        let catalog = sample_catalog(&dir);
        let _ = catalog.filter("bc");
        let _ = catalog.filter("xyz");
        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog.channels()[0].name, "BBC");
    }

    #[test]
    fn test_add_appends_at_end() {
        let dir = TempDir::new().unwrap();
        let mut catalog = sample_catalog(&dir);
        catalog.add("RTE", "http://d").unwrap();
        assert_eq!(catalog.len(), 4);
        let last = catalog.channels().last().unwrap();
        assert_eq!(last.name, "RTE");
        assert_eq!(last.url, "http://d");
        // Prior entries untouched
        assert_eq!(catalog.channels()[0].name, "BBC");
        assert_eq!(catalog.channels()[2].name, "France 24");
    }

    #[test]
    fn test_add_does_not_deduplicate() {
        let dir = TempDir::new().unwrap();
        let mut catalog = sample_catalog(&dir);
        catalog.add("BBC", "http://a").unwrap();
        assert_eq!(catalog.len(), 4);
    }

    #[test]
    fn test_add_empty_name_rejected() {
        let dir = TempDir::new().unwrap();
        let mut catalog = sample_catalog(&dir);
        let err = catalog.add("", "http://d").unwrap_err();
        assert!(matches!(err, CatalogError::InvalidInput(_)));
        assert_eq!(catalog.len(), 3);
    }

    #[test]
    fn test_add_empty_url_rejected() {
        let dir = TempDir::new().unwrap();
        let mut catalog = sample_catalog(&dir);
        let before: Vec<_> = catalog.channels().to_vec();
        let err = catalog.add("RTE", "").unwrap_err();
        assert!(matches!(err, CatalogError::InvalidInput(_)));
        assert_eq!(catalog.channels(), &before[..]);
    }

    #[test]
    fn test_save_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let catalog = sample_catalog(&dir);

        let loaded = Catalog::load(dir.path().join("channels.json")).unwrap();
        assert_eq!(loaded.channels(), catalog.channels());
    }

    #[test]
    fn test_add_is_persisted_immediately() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("channels.json");
        let mut catalog = sample_catalog(&dir);
        catalog.add("RTE", "http://d").unwrap();

        let loaded = Catalog::load(&path).unwrap();
        assert_eq!(loaded.len(), 4);
        assert_eq!(loaded.channels().last().unwrap().name, "RTE");
    }

    #[test]
    fn test_storage_uses_nombre_field() {
        let dir = TempDir::new().unwrap();
        let catalog = sample_catalog(&dir);
        let content = std::fs::read_to_string(catalog.path()).unwrap();
        assert!(content.contains("\"nombre\""));
        assert!(!content.contains("\"name\""));
    }

    #[test]
    fn test_load_reads_legacy_format() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("channels.json");
        std::fs::write(
            &path,
            r#"[
  {"nombre": "News Channel", "url": "http://example.com/stream1.m3u8"},
  {"nombre": "Sports Channel", "url": "http://example.com/stream2.m3u8"}
]"#,
        )
        .unwrap();

        let catalog = Catalog::load(&path).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.channels()[0].name, "News Channel");
        assert_eq!(catalog.channels()[1].url, "http://example.com/stream2.m3u8");
    }

    #[test]
    fn test_load_missing_file_is_storage_unavailable() {
        let dir = TempDir::new().unwrap();
        let err = Catalog::load(dir.path().join("channels.json")).unwrap_err();
        assert!(matches!(err, CatalogError::StorageUnavailable(_)));
    }

    #[test]
    fn test_load_malformed_file_is_corrupt_storage() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("channels.json");
        std::fs::write(&path, "{ not json").unwrap();
        let err = Catalog::load(&path).unwrap_err();
        assert!(matches!(err, CatalogError::CorruptStorage { .. }));
    }

    #[test]
    fn test_resolve_uses_view_index_not_catalog_index() {
        let dir = TempDir::new().unwrap();
        let catalog = sample_catalog(&dir);
        let view = catalog.filter("france");
        // "France 24" is index 2 in the catalog but index 0 in this view
        assert_eq!(resolve(&view, 0).unwrap(), "http://c");
    }

    #[test]
    fn test_resolve_out_of_range() {
        let dir = TempDir::new().unwrap();
        let catalog = sample_catalog(&dir);
        let view = catalog.filter("bc");
        let err = resolve(&view, 2).unwrap_err();
        assert!(matches!(
            err,
            CatalogError::IndexOutOfRange { index: 2, len: 2 }
        ));
    }

    #[test]
    fn test_contains_ignore_case() {
        assert!(contains_ignore_case("BBC News", "bbc"));
        assert!(contains_ignore_case("bbc news", "NEWS"));
        assert!(contains_ignore_case("anything", ""));
        assert!(!contains_ignore_case("BBC", "BBCC"));
        assert!(!contains_ignore_case("", "a"));
    }
}
