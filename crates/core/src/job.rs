//! Job configuration payloads.
//!
//! [`JobConfig`] is a tagged union with one variant per supported job
//! kind. The client serializes the whole configuration to a JSON string
//! before submission and never interprets field values beyond their
//! static shape — value-level validation is the backend's job.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Enumerated parameter domains
// ---------------------------------------------------------------------------

/// Samplers accepted by the stable-diffusion services.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sampler {
    #[serde(rename = "plms")]
    Plms,
    #[serde(rename = "ddim")]
    Ddim,
    #[default]
    #[serde(rename = "k_lms")]
    KLms,
    #[serde(rename = "k_euler")]
    KEuler,
    #[serde(rename = "k_euler_ancestral")]
    KEulerAncestral,
    #[serde(rename = "k_heun")]
    KHeun,
    #[serde(rename = "k_dpm_2")]
    KDpm2,
    #[serde(rename = "k_dpm_2_ancestral")]
    KDpm2Ancestral,
}

/// Output encodings for generated images.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    #[default]
    Avif,
    Jpeg,
    Png,
    Webp,
}

/// The fixed set of image dimensions the services accept.
///
/// Serialized as the plain pixel count; deserializing any other number
/// fails with a validation error.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum ImageDimension {
    D384,
    D448,
    #[default]
    D512,
    D576,
    D640,
    D768,
    D1024,
}

impl From<ImageDimension> for u32 {
    fn from(dim: ImageDimension) -> u32 {
        match dim {
            ImageDimension::D384 => 384,
            ImageDimension::D448 => 448,
            ImageDimension::D512 => 512,
            ImageDimension::D576 => 576,
            ImageDimension::D640 => 640,
            ImageDimension::D768 => 768,
            ImageDimension::D1024 => 1024,
        }
    }
}

impl TryFrom<u32> for ImageDimension {
    type Error = CoreError;

    fn try_from(value: u32) -> Result<Self, CoreError> {
        match value {
            384 => Ok(Self::D384),
            448 => Ok(Self::D448),
            512 => Ok(Self::D512),
            576 => Ok(Self::D576),
            640 => Ok(Self::D640),
            768 => Ok(Self::D768),
            1024 => Ok(Self::D1024),
            other => Err(CoreError::Validation(format!(
                "Invalid image dimension {other}. Must be one of: 384, 448, 512, 576, 640, 768, 1024"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Stable diffusion
// ---------------------------------------------------------------------------

/// Parameter set for a stable-diffusion generation job.
///
/// Defaults follow the service documentation; only `prompt` has no
/// sensible default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StableDiffusionConfig {
    pub prompt: String,
    #[serde(default)]
    pub negative_prompt: String,
    #[serde(default = "default_steps")]
    pub steps: u32,
    #[serde(default)]
    pub skip_steps: u32,
    #[serde(default = "default_batch_size")]
    pub batch_size: u32,
    #[serde(default)]
    pub sampler: Sampler,
    #[serde(default = "default_guidance_scale")]
    pub guidance_scale: f64,
    #[serde(default)]
    pub width: ImageDimension,
    #[serde(default)]
    pub height: ImageDimension,
    #[serde(default)]
    pub image_format: ImageFormat,
    /// Ask the backend to translate the prompt to English first.
    #[serde(default)]
    pub translate_prompt: bool,
    #[serde(default)]
    pub nsfw_filter: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    /// Reference to a source image for img2img jobs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub init_image: Option<String>,
    /// Reference to an inpainting mask.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mask_image: Option<String>,
}

fn default_steps() -> u32 {
    28
}

fn default_batch_size() -> u32 {
    1
}

fn default_guidance_scale() -> f64 {
    7.5
}

impl StableDiffusionConfig {
    /// Create a configuration with the given prompt and every other
    /// field at its default.
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            negative_prompt: String::new(),
            steps: default_steps(),
            skip_steps: 0,
            batch_size: default_batch_size(),
            sampler: Sampler::default(),
            guidance_scale: default_guidance_scale(),
            width: ImageDimension::default(),
            height: ImageDimension::default(),
            image_format: ImageFormat::default(),
            translate_prompt: false,
            nsfw_filter: false,
            seed: None,
            init_image: None,
            mask_image: None,
        }
    }
}

// ---------------------------------------------------------------------------
// JobConfig
// ---------------------------------------------------------------------------

/// Configuration payload for one job, tagged by job kind.
///
/// Serialized untagged so the wire form is exactly the parameter object
/// the service expects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum JobConfig {
    StableDiffusion(StableDiffusionConfig),
}

impl JobConfig {
    /// Serialize to the transport form: a JSON string embedded in the
    /// job-creation call as `p_job_config`.
    pub fn to_wire(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl From<StableDiffusionConfig> for JobConfig {
    fn from(config: StableDiffusionConfig) -> Self {
        Self::StableDiffusion(config)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn wire_form_round_trips_field_for_field() {
        let config = JobConfig::StableDiffusion(StableDiffusionConfig {
            negative_prompt: "blurry".to_string(),
            steps: 50,
            sampler: Sampler::KEulerAncestral,
            width: ImageDimension::D768,
            seed: Some(1234),
            ..StableDiffusionConfig::new("a lighthouse at dusk")
        });

        let wire = config.to_wire().unwrap();
        let parsed: JobConfig = serde_json::from_str(&wire).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn defaults_match_service_documentation() {
        let config = StableDiffusionConfig::new("test");
        assert_eq!(config.steps, 28);
        assert_eq!(config.skip_steps, 0);
        assert_eq!(config.batch_size, 1);
        assert_eq!(config.sampler, Sampler::KLms);
        assert_eq!(config.guidance_scale, 7.5);
        assert_eq!(u32::from(config.width), 512);
        assert_eq!(u32::from(config.height), 512);
        assert_eq!(config.image_format, ImageFormat::Avif);
        assert!(!config.translate_prompt);
        assert!(!config.nsfw_filter);
        assert!(config.seed.is_none());
    }

    #[test]
    fn sampler_wire_spellings() {
        let json = serde_json::to_value(Sampler::KDpm2Ancestral).unwrap();
        assert_eq!(json, serde_json::json!("k_dpm_2_ancestral"));
        let parsed: Sampler = serde_json::from_value(serde_json::json!("k_euler")).unwrap();
        assert_eq!(parsed, Sampler::KEuler);
    }

    #[test]
    fn image_format_wire_spellings() {
        assert_eq!(
            serde_json::to_value(ImageFormat::Webp).unwrap(),
            serde_json::json!("webp")
        );
    }

    #[test]
    fn dimensions_serialize_as_pixel_counts() {
        let json = serde_json::to_value(ImageDimension::D1024).unwrap();
        assert_eq!(json, serde_json::json!(1024));
    }

    #[test]
    fn dimension_outside_fixed_set_is_rejected() {
        let result: Result<ImageDimension, _> = serde_json::from_value(serde_json::json!(600));
        assert!(result.is_err());
    }

    #[test]
    fn try_from_reports_validation_error() {
        assert_matches!(ImageDimension::try_from(600), Err(CoreError::Validation(_)));
    }

    #[test]
    fn partial_wire_payload_fills_defaults() {
        let wire = r#"{"prompt":"a cat"}"#;
        let parsed: JobConfig = serde_json::from_str(wire).unwrap();
        let JobConfig::StableDiffusion(config) = parsed;
        assert_eq!(config.prompt, "a cat");
        assert_eq!(config.steps, 28);
        assert_eq!(config.sampler, Sampler::KLms);
    }

    #[test]
    fn absent_optionals_are_omitted_from_wire() {
        let wire = JobConfig::StableDiffusion(StableDiffusionConfig::new("x"))
            .to_wire()
            .unwrap();
        assert!(!wire.contains("seed"));
        assert!(!wire.contains("init_image"));
        assert!(!wire.contains("mask_image"));
    }
}
