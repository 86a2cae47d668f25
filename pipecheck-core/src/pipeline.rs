//! Catalog of the pipeline scripts the harness knows how to drive.

use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::CoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Pipeline {
    Detection,
    PoseEstimation,
    InstanceSegmentation,
    FaceRecognition,
}

impl Pipeline {
    pub const ALL: [Pipeline; 4] = [
        Pipeline::Detection,
        Pipeline::PoseEstimation,
        Pipeline::InstanceSegmentation,
        Pipeline::FaceRecognition,
    ];

    /// Machine-friendly identifier for this pipeline.
    pub const fn as_str(self) -> &'static str {
        match self {
            Pipeline::Detection => "detection",
            Pipeline::PoseEstimation => "pose_estimation",
            Pipeline::InstanceSegmentation => "instance_segmentation",
            Pipeline::FaceRecognition => "face_recognition",
        }
    }

    pub const fn script_name(self) -> &'static str {
        match self {
            Pipeline::Detection => "detection.py",
            Pipeline::PoseEstimation => "pose_estimation.py",
            Pipeline::InstanceSegmentation => "instance_segmentation.py",
            Pipeline::FaceRecognition => "face_recognition.py",
        }
    }

    pub fn script_path(self, pipelines_dir: &Path) -> PathBuf {
        pipelines_dir.join(self.script_name())
    }

    pub const fn variants_display() -> &'static str {
        "detection, pose_estimation, instance_segmentation, face_recognition"
    }
}

impl fmt::Display for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Pipeline {
    type Err = CoreError;

    /// Accepts the identifier, its dashed form, or the script file name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        let normalized = normalized.strip_suffix(".py").unwrap_or(&normalized);

        Pipeline::ALL
            .into_iter()
            .find(|p| p.as_str() == normalized)
            .ok_or_else(|| {
                CoreError::Config(format!(
                    "Unknown pipeline '{}'. Expected one of: {}",
                    s,
                    Pipeline::variants_display()
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_accepts_all_spellings() {
        assert_eq!("detection".parse::<Pipeline>().unwrap(), Pipeline::Detection);
        assert_eq!(
            "pose-estimation".parse::<Pipeline>().unwrap(),
            Pipeline::PoseEstimation
        );
        assert_eq!(
            "instance_segmentation.py".parse::<Pipeline>().unwrap(),
            Pipeline::InstanceSegmentation
        );
        assert_eq!(
            "Face_Recognition".parse::<Pipeline>().unwrap(),
            Pipeline::FaceRecognition
        );
    }

    #[test]
    fn test_parse_rejects_unknown() {
        let err = "segmentation".parse::<Pipeline>().unwrap_err();
        assert!(err.to_string().contains("Unknown pipeline 'segmentation'"));
    }

    #[test]
    fn test_script_path_joins_dir() {
        assert_eq!(
            Pipeline::PoseEstimation.script_path(Path::new("basic_pipelines")),
            PathBuf::from("basic_pipelines/pose_estimation.py")
        );
    }

    #[test]
    fn test_display_round_trips_through_parse() {
        for pipeline in Pipeline::ALL {
            assert_eq!(pipeline.to_string().parse::<Pipeline>().unwrap(), pipeline);
        }
    }
}
