//! Named-entity recognition backends
//!
//! The extraction pipeline only depends on the [`EntityRecognizer`] trait:
//! one operation taking a text span and returning labeled entities with
//! confidence scores. The real backend uses GLiNER (via gline-rs) with the
//! model embedded in the binary at compile time, behind the `embedded-ner`
//! feature. Tests inject deterministic recognizers instead.

use anyhow::Result;

/// One entity span reported by a recognizer.
#[derive(Debug, Clone, PartialEq)]
pub struct NerEntity {
    /// Entity label, e.g. "organization"
    pub label: String,
    /// Surface text of the span
    pub text: String,
    /// Model confidence (0.0 - 1.0)
    pub score: f32,
}

/// External NER capability: text span in, entities out.
///
/// Implementations must be shareable across the worker pool.
pub trait EntityRecognizer: Send + Sync {
    fn recognize(&self, text: &str) -> Result<Vec<NerEntity>>;
}

/// Recognizer that never reports entities. Used when the binary is built
/// without the `embedded-ner` feature; every filing then routes to manual
/// review instead of failing.
pub struct NoopRecognizer;

impl EntityRecognizer for NoopRecognizer {
    fn recognize(&self, _text: &str) -> Result<Vec<NerEntity>> {
        Ok(Vec::new())
    }
}

#[cfg(feature = "embedded-ner")]
pub use embedded::GlinerRecognizer;

#[cfg(feature = "embedded-ner")]
mod embedded {
    use super::{EntityRecognizer, NerEntity};
    use anyhow::{anyhow, Result};
    use gliner::model::input::text::TextInput;
    use gliner::model::params::Parameters;
    use gliner::model::pipeline::span::SpanMode;
    use gliner::model::GLiNER;
    use orp::params::RuntimeParameters;
    use std::io::Write;
    use tracing::{debug, info};

    /// Model bytes embedded at compile time
    static MODEL_BYTES: &[u8] = include_bytes!("../models/gliner_small.onnx");
    static TOKENIZER_BYTES: &[u8] = include_bytes!("../models/tokenizer.json");
    static CONFIG_BYTES: &[u8] = include_bytes!("../models/config.json");

    /// GLiNER-backed recognizer. The embedded model files are written to a
    /// temp directory on first construction because gline-rs loads from
    /// file paths.
    pub struct GlinerRecognizer {
        model: GLiNER<SpanMode>,
        min_confidence: f32,
    }

    impl GlinerRecognizer {
        pub fn new(min_confidence: f32) -> Result<Self> {
            let temp_dir = std::env::temp_dir().join("lenderfinder_ner");
            std::fs::create_dir_all(&temp_dir)?;

            let model_path = temp_dir.join("gliner_small.onnx");
            let tokenizer_path = temp_dir.join("tokenizer.json");
            let config_path = temp_dir.join("config.json");

            write_if_missing(&model_path, MODEL_BYTES)?;
            write_if_missing(&tokenizer_path, TOKENIZER_BYTES)?;
            write_if_missing(&config_path, CONFIG_BYTES)?;

            debug!("Model files written to {:?}", temp_dir);

            let model = GLiNER::<SpanMode>::new(
                Parameters::default(),
                RuntimeParameters::default(),
                tokenizer_path
                    .to_str()
                    .ok_or_else(|| anyhow!("Invalid tokenizer path"))?,
                model_path
                    .to_str()
                    .ok_or_else(|| anyhow!("Invalid model path"))?,
            )
            .map_err(|e| anyhow!("Failed to initialize GLiNER model: {}", e))?;

            info!("NER model initialized successfully");

            Ok(Self {
                model,
                min_confidence,
            })
        }
    }

    fn write_if_missing(path: &std::path::Path, bytes: &[u8]) -> Result<()> {
        if !path.exists() {
            let mut file = std::fs::File::create(path)?;
            file.write_all(bytes)?;
            debug!("Wrote model file: {:?}", path);
        }
        Ok(())
    }

    impl EntityRecognizer for GlinerRecognizer {
        fn recognize(&self, text: &str) -> Result<Vec<NerEntity>> {
            let input = TextInput::from_str(&[text], &["organization"])
                .map_err(|e| anyhow!("Failed to create TextInput: {}", e))?;

            let output = self
                .model
                .inference(input)
                .map_err(|e| anyhow!("NER inference failed: {}", e))?;

            let mut entities = Vec::new();
            for spans in &output.spans {
                for span in spans {
                    let score = span.probability();
                    if score < self.min_confidence {
                        continue;
                    }
                    let surface = span.text().trim();
                    if surface.is_empty() {
                        continue;
                    }
                    entities.push(NerEntity {
                        label: span.class().to_lowercase(),
                        text: surface.to_string(),
                        score,
                    });
                }
            }
            Ok(entities)
        }
    }
}
