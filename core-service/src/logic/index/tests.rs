//! Tests for the similarity index and its persistence

#[cfg(test)]
mod search_tests {
    use ndarray::array;

    use crate::logic::index::{IndexError, SimilarityIndex};

    fn chunks(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_empty_index_search_is_empty() {
        let index = SimilarityIndex::new(3);
        assert!(index.search(&[1.0, 0.0, 0.0], 5).unwrap().is_empty());
        // Width is not checked against an empty index
        assert!(index.search(&[1.0], 5).unwrap().is_empty());
    }

    #[test]
    fn test_add_rejects_bad_shapes_without_applying() {
        let mut index = SimilarityIndex::new(3);

        let wide = array![[1.0f32, 0.0, 0.0, 0.0]];
        assert!(matches!(
            index.add(wide.view(), &chunks(&["a"])),
            Err(IndexError::ShapeMismatch { what: "embedding width", expected: 3, actual: 4 })
        ));

        let two_rows = array![[1.0f32, 0.0, 0.0], [0.0, 1.0, 0.0]];
        assert!(matches!(
            index.add(two_rows.view(), &chunks(&["a"])),
            Err(IndexError::ShapeMismatch { what: "chunk count", .. })
        ));

        assert!(index.is_empty());
        assert_eq!(index.vectors().nrows(), 0);
    }

    #[test]
    fn test_search_orders_by_similarity() {
        let mut index = SimilarityIndex::new(2);
        let rows = array![[1.0f32, 0.0], [0.0, 1.0], [0.6, 0.8]];
        index.add(rows.view(), &chunks(&["east", "north", "between"])).unwrap();

        let hits = index.search(&[1.0, 0.0], 5).unwrap();
        let order: Vec<&str> = hits.iter().map(|h| h.chunk.as_str()).collect();
        assert_eq!(order, vec!["east", "between", "north"]);
        assert!((hits[0].similarity - 1.0).abs() < 1e-6);
        assert!((hits[1].similarity - 0.6).abs() < 1e-6);
    }

    #[test]
    fn test_ties_break_by_offset_and_top_k_caps() {
        let mut index = SimilarityIndex::new(2);
        let rows = array![[0.0f32, 1.0], [1.0, 0.0], [1.0, 0.0], [1.0, 0.0]];
        index.add(rows.view(), &chunks(&["n", "a", "b", "c"])).unwrap();

        let hits = index.search(&[1.0, 0.0], 2).unwrap();
        let offsets: Vec<usize> = hits.iter().map(|h| h.offset).collect();
        assert_eq!(offsets, vec![1, 2]);
    }

    #[test]
    fn test_offsets_are_append_only() {
        let mut index = SimilarityIndex::new(2);
        index.add(array![[1.0f32, 0.0]].view(), &chunks(&["first"])).unwrap();
        index.add(array![[0.0f32, 1.0]].view(), &chunks(&["second"])).unwrap();

        assert_eq!(index.chunk(0), Some("first"));
        assert_eq!(index.chunk(1), Some("second"));

        let entry = index.entry(1).unwrap();
        assert_eq!(entry.text, "second");
        assert_eq!(entry.embedding.to_vec(), vec![0.0, 1.0]);
        assert!(index.entry(2).is_none());
        assert_eq!(index.search(&[0.0, 1.0], 1).unwrap()[0].offset, 1);
    }

    #[test]
    fn test_query_width_mismatch() {
        let mut index = SimilarityIndex::new(2);
        index.add(array![[1.0f32, 0.0]].view(), &chunks(&["x"])).unwrap();
        assert!(matches!(
            index.search(&[1.0, 0.0, 0.0], 1),
            Err(IndexError::ShapeMismatch { what: "query width", .. })
        ));
    }
}

#[cfg(test)]
mod persistence_tests {
    use ndarray::array;

    use crate::logic::index::storage::MANIFEST_FILE;
    use crate::logic::index::{persist, read_manifest, restore, IndexError, PolicyStore, SimilarityIndex};

    fn sample_index() -> SimilarityIndex {
        let mut index = SimilarityIndex::new(3);
        let rows = array![[1.0f32, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0], [0.577, 0.577, 0.577]];
        let texts: Vec<String> = ["alpha", "beta", "gamma", "mixed"].iter().map(|s| s.to_string()).collect();
        index.add(rows.view(), &texts).unwrap();
        index
    }

    #[test]
    fn test_round_trip_search_identical() {
        let dir = tempfile::tempdir().unwrap();
        let index = sample_index();
        persist(&index, dir.path()).unwrap();

        let restored = restore(dir.path()).unwrap();
        assert_eq!(restored, index);

        for query in [[1.0f32, 0.0, 0.0], [0.0, 0.7071, 0.7071], [0.577, 0.577, 0.577]] {
            assert_eq!(index.search(&query, 3).unwrap(), restored.search(&query, 3).unwrap());
        }
    }

    #[test]
    fn test_missing_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(restore(dir.path()), Err(IndexError::NotFound(_))));

        persist(&sample_index(), dir.path()).unwrap();
        let manifest = read_manifest(dir.path()).unwrap();
        std::fs::remove_file(dir.path().join(&manifest.chunks_file)).unwrap();
        assert!(matches!(restore(dir.path()), Err(IndexError::NotFound(_))));
    }

    #[test]
    fn test_tampered_half_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        persist(&sample_index(), dir.path()).unwrap();
        let manifest = read_manifest(dir.path()).unwrap();

        std::fs::write(dir.path().join(&manifest.chunks_file), br#"["alpha","beta"]"#).unwrap();
        assert!(matches!(restore(dir.path()), Err(IndexError::Corrupt(_))));
    }

    #[test]
    fn test_manifest_garbage_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(MANIFEST_FILE), b"{").unwrap();
        assert!(matches!(restore(dir.path()), Err(IndexError::Corrupt(_))));
    }

    #[test]
    fn test_new_generation_prunes_old() {
        let dir = tempfile::tempdir().unwrap();
        let mut index = sample_index();
        let first = persist(&index, dir.path()).unwrap();

        index.add(array![[0.0f32, 1.0, 0.0]].view(), &["delta".to_string()]).unwrap();
        let second = persist(&index, dir.path()).unwrap();

        assert_eq!(second.generation, first.generation + 1);
        assert!(!dir.path().join(&first.index_file).exists());
        assert!(!dir.path().join(&first.chunks_file).exists());
        assert_eq!(restore(dir.path()).unwrap().len(), 5);
    }

    #[test]
    fn test_unswapped_generation_leaves_previous_authoritative() {
        let dir = tempfile::tempdir().unwrap();
        persist(&sample_index(), dir.path()).unwrap();

        // Halves of a newer generation written, manifest never swapped
        std::fs::write(dir.path().join("policy.2.index.json"), b"{partial").unwrap();
        std::fs::write(dir.path().join("policy_chunks.2.json"), b"[\"x\"]").unwrap();

        let restored = restore(dir.path()).unwrap();
        assert_eq!(restored.len(), 4);
    }

    #[test]
    fn test_store_add_and_persist() {
        let dir = tempfile::tempdir().unwrap();
        let store = PolicyStore::open_or_empty(dir.path(), 2).unwrap();
        assert!(store.is_empty());
        assert!(store.search(&[1.0, 0.0], 3).unwrap().is_empty());

        let added = store
            .add_and_persist(array![[1.0f32, 0.0], [0.0, 1.0]].view(), &["a".to_string(), "b".to_string()])
            .unwrap();
        assert_eq!(added, 2);

        let reopened = PolicyStore::open_or_empty(dir.path(), 2).unwrap();
        assert_eq!(reopened.len(), 2);
        assert_eq!(reopened.search(&[0.0, 1.0], 1).unwrap()[0].chunk, "b");
    }

    #[test]
    fn test_concurrent_persist_is_serialised() {
        use std::sync::Arc;

        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(PolicyStore::empty(dir.path(), 2));
        store
            .add_and_persist(array![[1.0f32, 0.0], [0.0, 1.0]].view(), &["a".to_string(), "b".to_string()])
            .unwrap();

        let handles: Vec<_> = (0..6)
            .map(|_| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || store.persist())
            })
            .collect();
        for handle in handles {
            handle.join().unwrap().unwrap();
        }

        let manifest = read_manifest(dir.path()).unwrap();
        assert_eq!(manifest.generation, 7);
        assert_eq!(restore(dir.path()).unwrap().len(), 2);

        let files: Vec<String> = std::fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(files.len(), 3, "{files:?}");
    }

    #[test]
    fn test_store_rejects_dimension_change() {
        let dir = tempfile::tempdir().unwrap();
        persist(&sample_index(), dir.path()).unwrap();
        assert!(matches!(
            PolicyStore::open_or_empty(dir.path(), 384),
            Err(IndexError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_store_shape_error_leaves_store_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let store = PolicyStore::empty(dir.path(), 2);
        assert!(store
            .add_and_persist(array![[1.0f32, 0.0, 0.0]].view(), &["bad".to_string()])
            .is_err());
        assert!(store.is_empty());
        assert!(!dir.path().join(MANIFEST_FILE).exists());
    }
}
