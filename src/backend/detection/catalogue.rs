//! Lesion class catalogue.
//!
//! Maps the detector's short class labels to a readable name, a risk level
//! and advice for the user.

use serde::Serialize;

use crate::backend::detection::Detection;

pub const UNKNOWN_RISK: &str = "Unknown";
pub const NO_ADVICE: &str = "No advice available.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LesionClass {
    pub code: &'static str,
    pub full_label: &'static str,
    pub risk_level: &'static str,
    pub advice: &'static str,
}

pub const LESION_CLASSES: [LesionClass; 7] = [
    LesionClass {
        code: "MEL",
        full_label: "Melanoma",
        risk_level: "High risk",
        advice: "Consult a dermatologist immediately. Melanoma can be aggressive and requires urgent attention.",
    },
    LesionClass {
        code: "NV",
        full_label: "Melanocytic Nevus",
        risk_level: "Low risk",
        advice: "No intervention required. Monitor periodically for changes.",
    },
    LesionClass {
        code: "BCC",
        full_label: "Basal Cell Carcinoma",
        risk_level: "Moderate risk",
        advice: "Consult a dermatologist for evaluation. Early treatment is usually effective.",
    },
    LesionClass {
        code: "AKIEC",
        full_label: "Actinic Keratoses / Intraepithelial Carcinoma",
        risk_level: "High risk",
        advice: "Requires medical assessment and possible biopsy to determine cancer risk.",
    },
    LesionClass {
        code: "BKL",
        full_label: "Benign Keratosis",
        risk_level: "Low risk",
        advice: "Generally harmless. Cosmetic removal can be considered.",
    },
    LesionClass {
        code: "DF",
        full_label: "Dermatofibroma",
        risk_level: "Low risk",
        advice: "Harmless fibrous lesion. No treatment necessary unless symptomatic.",
    },
    LesionClass {
        code: "VASC",
        full_label: "Vascular Lesion",
        risk_level: "Low to moderate risk",
        advice: "Consult a dermatologist for cosmetic or vascular concerns.",
    },
];

pub fn lookup(code: &str) -> Option<&'static LesionClass> {
    LESION_CLASSES.iter().find(|class| class.code == code)
}

/// An enriched detection as returned by `POST /detect`
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Prediction {
    pub class: String,
    pub confidence: f64,
    pub full_label: String,
    pub risk_level: String,
    pub advice: String,
}

impl From<Detection> for Prediction {
    fn from(detection: Detection) -> Self {
        let confidence = (detection.confidence * 100.0).round() / 100.0;
        match lookup(&detection.label) {
            Some(class) => Self {
                class: detection.label,
                confidence,
                full_label: class.full_label.to_string(),
                risk_level: class.risk_level.to_string(),
                advice: class.advice.to_string(),
            },
            None => Self {
                full_label: detection.label.clone(),
                class: detection.label,
                confidence,
                risk_level: UNKNOWN_RISK.to_string(),
                advice: NO_ADVICE.to_string(),
            },
        }
    }
}
