//! Classification service port and its HTTP implementation.

use std::time::Duration;

use reqwest::blocking::{multipart, Client};
use serde::Deserialize;
use serde_json::Value;

use super::file::ImageFile;
use crate::error::UploadError;
use crate::metrics::METRIC_COUNT;

/// Multipart field carrying the image bytes.
pub const IMAGE_FIELD: &str = "image";

/// Something that turns an image into ingredients and nutrition readings.
pub trait Classifier: Send + Sync {
    /// Submit one image. Transport-level failures are errors; a structured
    /// `error` field is left in the response for the pipeline to judge.
    fn classify(&self, file: &ImageFile) -> Result<ClassificationResponse, UploadError>;
}

/// Body of a successful transport-level response.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ClassificationResponse {
    #[serde(default)]
    pub ingredients: Option<Value>,
    #[serde(default)]
    pub nutrition: Option<Value>,
    #[serde(default)]
    pub error: Option<Value>,
}

impl ClassificationResponse {
    /// Response carrying ingredients and a nutrition vector.
    pub fn success(ingredients: &str, nutrition: &[f64]) -> Self {
        Self {
            ingredients: Some(Value::from(ingredients)),
            nutrition: Some(Value::from(nutrition.to_vec())),
            error: None,
        }
    }

    /// Response carrying only a structured error.
    pub fn service_error(message: &str) -> Self {
        Self {
            error: Some(serde_json::json!({ "message": message })),
            ..Self::default()
        }
    }

    /// The structured error, if the `error` field is present and truthy.
    pub fn error(&self) -> Option<UploadError> {
        let error = self.error.as_ref().filter(|e| is_truthy(e))?;
        let message = error
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or_default();
        Some(UploadError::Service(message.to_string()))
    }

    /// Ingredient text, empty when absent or not a string.
    pub fn ingredient_text(&self) -> &str {
        self.ingredients
            .as_ref()
            .and_then(Value::as_str)
            .unwrap_or_default()
    }

    /// Readings in canonical order, only when the vector has exactly six entries.
    pub fn readings(&self) -> Option<[u32; METRIC_COUNT]> {
        let entries = self.nutrition.as_ref()?.as_array()?;
        if entries.len() != METRIC_COUNT {
            return None;
        }
        let mut readings = [0; METRIC_COUNT];
        for (slot, entry) in readings.iter_mut().zip(entries) {
            *slot = coerce_reading(entry);
        }
        Some(readings)
    }
}

/// Finite positive numbers round to the nearest whole unit; anything else is 0.
fn coerce_reading(value: &Value) -> u32 {
    match value.as_f64() {
        Some(n) if n.is_finite() && n > 0.0 => {
            let rounded = n.round();
            if rounded >= f64::from(u32::MAX) {
                u32::MAX
            } else {
                rounded as u32
            }
        }
        _ => 0,
    }
}

/// JavaScript truthiness of a JSON value.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// POSTs the image as a single multipart field.
#[derive(Debug, Clone)]
pub struct HttpClassifier {
    client: Client,
    endpoint: String,
}

impl HttpClassifier {
    /// Build a client. Without a timeout the transport's own behaviour applies.
    pub fn new(endpoint: impl Into<String>, timeout: Option<Duration>) -> Result<Self, reqwest::Error> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl Classifier for HttpClassifier {
    fn classify(&self, file: &ImageFile) -> Result<ClassificationResponse, UploadError> {
        let transport = |e: reqwest::Error| UploadError::Transport(e.to_string());

        let part = multipart::Part::bytes(file.bytes.clone())
            .file_name(file.name.clone())
            .mime_str(&file.media_type)
            .map_err(transport)?;
        let form = multipart::Form::new().part(IMAGE_FIELD, part);

        let response = self
            .client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .map_err(transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(UploadError::Status(status.as_u16()));
        }
        response.json().map_err(transport)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> ClassificationResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn readings_require_six_entries() {
        assert_eq!(
            parse(r#"{"nutrition":[650,22,85,900,70,35]}"#).readings(),
            Some([650, 22, 85, 900, 70, 35])
        );
        assert_eq!(parse(r#"{"nutrition":[1,2,3,4,5]}"#).readings(), None);
        assert_eq!(parse(r#"{"nutrition":[1,2,3,4,5,6,7]}"#).readings(), None);
        assert_eq!(parse(r#"{"nutrition":"lots"}"#).readings(), None);
        assert_eq!(parse(r#"{}"#).readings(), None);
    }

    #[test]
    fn falsy_readings_coerce_to_zero() {
        let response = parse(r#"{"nutrition":[null,"x",false,-3,0,12.6]}"#);
        assert_eq!(response.readings(), Some([0, 0, 0, 0, 0, 13]));
    }

    #[test]
    fn ingredient_text_defaults_empty() {
        assert_eq!(parse(r#"{}"#).ingredient_text(), "");
        assert_eq!(parse(r#"{"ingredients":null}"#).ingredient_text(), "");
        assert_eq!(parse(r#"{"ingredients":"rice\nbeans"}"#).ingredient_text(), "rice\nbeans");
    }

    #[test]
    fn structured_error_detection() {
        assert_eq!(
            parse(r#"{"error":{"message":"No food detected"}}"#).error(),
            Some(UploadError::Service("No food detected".into()))
        );
        assert_eq!(parse(r#"{"error":null}"#).error(), None);
        assert_eq!(parse(r#"{"error":false}"#).error(), None);
        assert_eq!(parse(r#"{"error":""}"#).error(), None);
        assert_eq!(
            parse(r#"{"error":"boom"}"#).error(),
            Some(UploadError::Service(String::new()))
        );
    }

    #[test]
    fn constructors() {
        let ok = ClassificationResponse::success("egg", &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        assert_eq!(ok.readings(), Some([1, 2, 3, 4, 5, 6]));
        assert!(ok.error().is_none());
        let failed = ClassificationResponse::service_error("X");
        assert_eq!(failed.error(), Some(UploadError::Service("X".into())));
    }

    #[test]
    fn http_classifier_keeps_endpoint() {
        let classifier = HttpClassifier::new("http://127.0.0.1:9/api", None).unwrap();
        assert_eq!(classifier.endpoint(), "http://127.0.0.1:9/api");
    }

    #[test]
    fn unreachable_endpoint_is_transport_error() {
        let classifier =
            HttpClassifier::new("http://127.0.0.1:9/", Some(Duration::from_secs(2))).unwrap();
        let file = ImageFile::new("a.png", "image/png", vec![1, 2, 3]);
        assert!(matches!(
            classifier.classify(&file),
            Err(UploadError::Transport(_))
        ));
    }
}
