//! Recording session state.
//!
//! Tracks camera facing, mute, and whether a clip is being recorded or
//! processed. Only one recording or processing cycle can be in flight.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::CaptureSettings;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CameraFacing {
    #[default]
    Front,
    Back,
}

impl CameraFacing {
    pub fn flipped(self) -> Self {
        match self {
            CameraFacing::Front => CameraFacing::Back,
            CameraFacing::Back => CameraFacing::Front,
        }
    }
}

impl fmt::Display for CameraFacing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CameraFacing::Front => f.write_str("front"),
            CameraFacing::Back => f.write_str("back"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CapturePhase {
    #[default]
    Idle,
    Recording,
    Processing,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CaptureError {
    #[error("Cannot {action} while {phase:?}")]
    Busy {
        action: &'static str,
        phase: CapturePhase,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureState {
    pub facing: CameraFacing,
    pub mute: bool,
    phase: CapturePhase,
    clip_duration: Duration,
}

impl CaptureState {
    pub fn from_settings(settings: &CaptureSettings) -> Self {
        Self {
            facing: settings.facing,
            mute: settings.mute,
            phase: CapturePhase::Idle,
            clip_duration: settings.clip_duration(),
        }
    }

    pub fn phase(&self) -> CapturePhase {
        self.phase
    }

    /// How long a recording runs before it stops on its own.
    pub fn clip_duration(&self) -> Duration {
        self.clip_duration
    }

    pub fn is_recording(&self) -> bool {
        self.phase == CapturePhase::Recording
    }

    pub fn is_processing(&self) -> bool {
        self.phase == CapturePhase::Processing
    }

    /// Switch camera. Not allowed mid-recording.
    pub fn toggle_facing(&mut self) -> Result<CameraFacing, CaptureError> {
        self.require(CapturePhase::Idle, "switch camera")?;
        self.facing = self.facing.flipped();
        Ok(self.facing)
    }

    pub fn toggle_mute(&mut self) -> bool {
        self.mute = !self.mute;
        self.mute
    }

    pub fn begin_recording(&mut self) -> Result<(), CaptureError> {
        self.require(CapturePhase::Idle, "start recording")?;
        self.phase = CapturePhase::Recording;
        Ok(())
    }

    /// Recording stopped; the clip goes to the pipeline.
    pub fn finish_recording(&mut self) -> Result<(), CaptureError> {
        self.require(CapturePhase::Recording, "stop recording")?;
        self.phase = CapturePhase::Processing;
        Ok(())
    }

    /// Pipeline finished, successfully or not.
    pub fn finish_processing(&mut self) -> Result<(), CaptureError> {
        self.require(CapturePhase::Processing, "finish processing")?;
        self.phase = CapturePhase::Idle;
        Ok(())
    }

    fn require(&self, phase: CapturePhase, action: &'static str) -> Result<(), CaptureError> {
        if self.phase != phase {
            return Err(CaptureError::Busy {
                action,
                phase: self.phase,
            });
        }
        Ok(())
    }
}

impl Default for CaptureState {
    fn default() -> Self {
        Self::from_settings(&CaptureSettings::default())
    }
}
