use fastinfoset_view::{
    error::{DecodeStage, FiErrorKind},
    fastinfoset::{Decoder, Event},
    pipeline::{self, DecodePipeline, PipelineConfig},
    xml::OutputPolicy,
};
use rand::{Rng, RngCore};
use rand_xoshiro::{Xoshiro256PlusPlus, rand_core::SeedableRng};

mod fi_generator;

#[tracing_test::traced_test]
#[test]
fn test_sample_document() {
    let document = fi_generator::encode_document(&fi_generator::sample_document());

    let output = pipeline::decode(&document, false).unwrap();

    assert_eq!(String::from_utf8(output).unwrap(), "<a>\n  <b>1</b>\n</a>");

    let output = pipeline::decode(&fi_generator::gzip(&document), true).unwrap();

    assert_eq!(String::from_utf8(output).unwrap(), "<a>\n  <b>1</b>\n</a>");
}

#[tracing_test::traced_test]
#[test]
fn test_round_trip() {
    let pipeline = DecodePipeline::default();

    for seed in 0..200 {
        let root = fi_generator::random_document(seed);
        let document = fi_generator::encode_document(&root);
        let expected = fi_generator::expected_xml(&root);

        let output = pipeline.decode(&document, false).unwrap();
        assert_eq!(String::from_utf8(output).unwrap(), expected, "seed {}", seed);

        let output = pipeline
            .decode(&fi_generator::gzip(&document), true)
            .unwrap();
        assert_eq!(String::from_utf8(output).unwrap(), expected, "seed {}", seed);
    }
}

#[test]
fn test_events_balanced() {
    for seed in 0..50 {
        let document = fi_generator::encode_document(&fi_generator::random_document(seed));
        let mut decoder = Decoder::new(&document).unwrap();
        let mut depth = 0usize;
        let mut max_depth = 0usize;

        while let Some(event) = decoder.next_event().unwrap() {
            match event {
                Event::StartElement(_) => {
                    depth += 1;
                    max_depth = max_depth.max(depth);
                }
                Event::EndElement(_) => depth -= 1,
                _ => {}
            }

            assert_eq!(depth, decoder.depth());
        }

        assert_eq!(depth, 0);
        assert!(max_depth >= 1);
        assert!(decoder.is_finished());
        assert_eq!(decoder.position(), document.len());
    }
}

#[test]
fn test_large_document() {
    let children = (0..3000)
        .map(|index| {
            fi_generator::Node::element(
                &format!("n{}", index % 100),
                vec![fi_generator::Node::text(&"v".repeat(index % 400 + 1))],
            )
        })
        .collect();
    let root = fi_generator::Node::element("root", children);

    let document = fi_generator::encode_document(&root);
    let output = pipeline::decode(&fi_generator::gzip(&document), true).unwrap();

    assert_eq!(
        String::from_utf8(output).unwrap(),
        fi_generator::expected_xml(&root)
    );
}

#[test]
fn test_gzip_flag_mismatch() {
    let document = fi_generator::encode_document(&fi_generator::sample_document());

    let error = pipeline::decode(&fi_generator::gzip(&document), false).unwrap_err();
    assert_eq!(error.stage(), DecodeStage::Transform);
    assert_eq!(
        error.as_fastinfoset().unwrap().kind(),
        FiErrorKind::NotFastInfoset
    );

    let error = pipeline::decode(&document, true).unwrap_err();
    assert_eq!(error.stage(), DecodeStage::Inflate);
}

#[test]
fn test_not_fastinfoset() {
    for body in [
        &b"<a><b>1</b></a>"[..],
        b"Hello world",
        b"",
        b"\xe0",
        b"\xe0\x00\x00",
    ] {
        let error = pipeline::decode(body, false).unwrap_err();
        assert_eq!(error.stage(), DecodeStage::Transform);
    }
}

#[test]
fn test_truncated() {
    let document = fi_generator::encode_document(&fi_generator::random_document(7));

    for length in 0..document.len() {
        let result = pipeline::decode(&document[..length], false);
        assert!(result.is_err(), "length {}", length);
    }

    let compressed = fi_generator::gzip(&document);

    for length in [1, 10, compressed.len() / 2, compressed.len() - 1] {
        let result = pipeline::decode(&compressed[..length], true);
        assert!(result.is_err(), "compressed length {}", length);
    }
}

#[test]
fn test_arbitrary_input() {
    let pipeline = DecodePipeline::default();

    for seed in 0..500 {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
        let length = rng.random_range(0..256);
        let mut data = vec![0; length];
        rng.fill_bytes(&mut data);

        if rng.random_bool(0.5) && data.len() >= 5 {
            data[..5].copy_from_slice(b"\xe0\x00\x00\x01\x00");
        }

        let _ = pipeline.decode(&data, false);
        let _ = pipeline.decode(&data, true);
    }
}

#[test]
fn test_corrupted_documents() {
    let pipeline = DecodePipeline::default();

    for seed in 0..200 {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
        let mut document = fi_generator::encode_document(&fi_generator::random_document(seed));

        for _ in 0..rng.random_range(1..4) {
            let index = rng.random_range(5..document.len());
            document[index] = rng.random();
        }

        let _ = pipeline.decode(&document, false);
    }
}

#[test]
fn test_output_policy() {
    let root = fi_generator::sample_document();
    let document = fi_generator::encode_document(&root);

    let pipeline = DecodePipeline::new(PipelineConfig {
        output: OutputPolicy {
            indent: true,
            indent_amount: 4,
            omit_declaration: false,
        },
        ..Default::default()
    });

    assert_eq!(
        String::from_utf8(pipeline.decode(&document, false).unwrap()).unwrap(),
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<a>\n    <b>1</b>\n</a>"
    );
}
