use std::fs;
use std::path::Path;

use proptest::prelude::*;
use tempfile::TempDir;

use shoprag_core::chunker::Chunker;
use shoprag_core::config::Config;
use shoprag_core::data_processor::{collect_chunks, load_faqs, load_products, DataProcessor, ProductRow};
use shoprag_core::error::Error;
use shoprag_core::types::SourceKind;

fn blue_shirt() -> ProductRow {
    ProductRow {
        id: "1".to_string(),
        title: "Blue Shirt".to_string(),
        categories: "Apparel".to_string(),
        brand: "Acme".to_string(),
        description: "Cotton shirt".to_string(),
    }
}

#[test]
fn overlap_not_below_max_tokens_is_rejected() {
    assert!(matches!(Chunker::new(10, 10), Err(Error::InvalidConfig(_))));
    assert!(matches!(Chunker::new(10, 25), Err(Error::InvalidConfig(_))));
    assert!(matches!(Chunker::new(0, 0), Err(Error::InvalidConfig(_))));
}

#[test]
fn empty_text_has_no_chunks() {
    let chunker = Chunker::default();
    assert_eq!(chunker.chunks("").count(), 0);
    assert_eq!(chunker.chunks(" \n\t ").count(), 0);
}

#[test]
fn chunks_are_restartable() {
    let chunker = Chunker::new(3, 1).expect("valid");
    let text = "a b c d e f g h";
    let first = chunker.chunks(text);
    let replay = first.clone();
    assert_eq!(first.collect::<Vec<_>>(), replay.collect::<Vec<_>>());
    assert_eq!(chunker.split(text), chunker.split(text));
}

#[test]
fn product_body_is_one_chunk() {
    let row = blue_shirt();
    assert_eq!(row.body(), "Blue Shirt | Apparel | Acme | Cotton shirt");
    let chunks = Chunker::default().split(&row.body());
    assert_eq!(chunks, vec![row.body()]);
}

#[test]
fn collect_chunks_keeps_product_then_faq_order() {
    let chunker = Chunker::new(4, 1).expect("valid");
    let faqs = "Returns are accepted within thirty days of delivery";
    let records = collect_chunks(&[blue_shirt()], Some(faqs), &chunker);

    let product: Vec<_> = records.iter().take_while(|r| r.source == SourceKind::Product).collect();
    assert!(!product.is_empty());
    assert!(product.iter().all(|r| r.id == "1" && r.title == "Blue Shirt"));
    let faq: Vec<_> = records.iter().skip(product.len()).collect();
    assert!(!faq.is_empty());
    assert!(faq.iter().all(|r| r.source == SourceKind::Faqs && r.id == "faqs" && r.title == "FAQs"));
}

#[test]
fn process_sources_reads_csv_and_optional_faqs() {
    let tmp = TempDir::new().expect("tmp");
    let csv = tmp.path().join("products.csv");
    fs::write(
        &csv,
        "id,title,categories,brand,description,price\n1,Blue Shirt,Apparel,Acme,Cotton shirt,19.99\n2,Red Mug,Kitchen,Acme,\"Ceramic mug, 300ml\",7.50\n",
    )
    .expect("write csv");

    let processor = DataProcessor::new(Chunker::default());
    let missing_faqs = tmp.path().join("faqs.md");
    let records = processor.process_sources(&csv, &missing_faqs).expect("process");
    assert_eq!(records.len(), 2, "one chunk per short product, no FAQ");
    assert_eq!(records[0].text, "Blue Shirt | Apparel | Acme | Cotton shirt");
    assert_eq!(records[1].text, "Red Mug | Kitchen | Acme | Ceramic mug, 300ml");

    fs::write(&missing_faqs, "# Shipping\n\nWe ship worldwide.").expect("write faqs");
    let records = processor.process_sources(&csv, &missing_faqs).expect("process");
    assert_eq!(records.len(), 3);
    assert_eq!(records[2].text, "# Shipping We ship worldwide.");
}

#[test]
fn missing_product_catalogue_is_fatal() {
    let tmp = TempDir::new().expect("tmp");
    let err = load_products(&tmp.path().join("nope.csv")).expect_err("must fail");
    assert!(matches!(err, Error::NotFound(_)));
    assert!(load_faqs(&tmp.path().join("nope.md")).expect("optional").is_none());
}

#[test]
fn config_layers_defaults_files_and_env() {
    figment::Jail::expect_with(|jail| {
        jail.create_file(
            "config.toml",
            r#"
            [chunking]
            max_tokens = 40
            overlap = 5

            [llm]
            model = "some-hosted-model"
            "#,
        )?;
        jail.create_file("config.test.toml", "[retrieval]\ntop_k = 7\n")?;
        jail.set_env("APP_EMBEDDING__BATCH_SIZE", "8");

        let config = Config::load_for_env(Path::new("."), "test").map_err(|e| e.to_string())?;
        let settings = config.settings().map_err(|e| e.to_string())?;
        assert_eq!(settings.chunking.max_tokens, 40);
        assert_eq!(settings.chunking.overlap, 5);
        assert_eq!(settings.retrieval.top_k, 7);
        assert_eq!(settings.embedding.batch_size, 8);
        assert_eq!(settings.llm.model, "some-hosted-model");
        assert!((settings.llm.temperature - 0.2).abs() < f32::EPSILON);
        assert_eq!(settings.llm.timeout_secs, 30);
        assert_eq!(settings.data.meta_path, "data/meta.jsonl");
        let top_k: usize = config.get("retrieval.top_k").map_err(|e| e.to_string())?;
        assert_eq!(top_k, 7);
        Ok(())
    });
}

#[test]
fn invalid_chunking_config_fails_fast() {
    figment::Jail::expect_with(|jail| {
        jail.create_file("config.toml", "[chunking]\nmax_tokens = 10\noverlap = 10\n")?;
        assert!(Config::load_for_env(Path::new("."), "dev").is_err());
        Ok(())
    });
}

#[test]
fn fake_embeddings_rejected_in_prod() {
    figment::Jail::expect_with(|jail| {
        jail.set_env("APP_EMBEDDING__USE_FAKE", "true");
        assert!(Config::load_for_env(Path::new("."), "prod").is_err());
        assert!(Config::load_for_env(Path::new("."), "dev").is_ok());
        Ok(())
    });
}

fn word_text(max_words: usize) -> impl Strategy<Value = String> {
    prop::collection::vec("[a-z]{1,6}", 0..max_words).prop_map(|w| w.join(" "))
}

proptest! {
    #[test]
    fn every_word_is_covered_and_windows_overlap(
        text in word_text(200),
        max_tokens in 1usize..30,
        overlap_seed in 0usize..30,
    ) {
        let overlap = overlap_seed % max_tokens;
        let chunker = Chunker::new(max_tokens, overlap).expect("valid");
        let words: Vec<&str> = text.split_whitespace().collect();
        let chunks: Vec<Vec<String>> = chunker
            .chunks(&text)
            .map(|c| c.split(' ').map(str::to_string).collect())
            .collect();

        if words.is_empty() {
            prop_assert!(chunks.is_empty());
        } else {
            // Reassemble the word sequence from chunk i at offset i * step.
            let step = max_tokens - overlap;
            let mut covered = vec![false; words.len()];
            for (i, chunk) in chunks.iter().enumerate() {
                prop_assert!(chunk.len() <= max_tokens);
                for (j, w) in chunk.iter().enumerate() {
                    prop_assert_eq!(w.as_str(), words[i * step + j]);
                    covered[i * step + j] = true;
                }
            }
            prop_assert!(covered.iter().all(|c| *c));
            for pair in chunks.windows(2) {
                let (prev, next) = (&pair[0], &pair[1]);
                prop_assert_eq!(prev.len(), max_tokens);
                prop_assert_eq!(&prev[max_tokens - overlap..], &next[..overlap]);
            }
        }
    }

    #[test]
    fn short_text_is_a_single_chunk(text in word_text(50), max_tokens in 50usize..80) {
        let chunker = Chunker::new(max_tokens, 10).expect("valid");
        let chunks = chunker.split(&text);
        if text.is_empty() {
            prop_assert!(chunks.is_empty());
        } else {
            prop_assert_eq!(chunks, vec![text.clone()]);
        }
    }
}
