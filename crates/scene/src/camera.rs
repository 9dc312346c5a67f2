use foundation::math::{Ecef, Enu, LocalFrame, ecef_to_geodetic};

/// Camera offset relative to a focus point.
///
/// Heading is clockwise from north, pitch is negative when looking down.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct HeadingPitchRange {
    pub heading_rad: f64,
    pub pitch_rad: f64,
    pub range_m: f64,
}

impl HeadingPitchRange {
    pub fn new(heading_rad: f64, pitch_rad: f64, range_m: f64) -> Self {
        Self {
            heading_rad,
            pitch_rad,
            range_m,
        }
    }

    /// Eye position for this offset around `focus`, in the focus' local ENU frame.
    pub fn eye_from(&self, focus: Ecef) -> Ecef {
        // The eye sits opposite the view direction.
        let toward_focus = Enu::along_view(self.heading_rad, self.pitch_rad, self.range_m);
        LocalFrame::at(ecef_to_geodetic(focus)).to_ecef(toward_focus.scaled(-1.0))
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Orientation {
    pub heading_rad: f64,
    pub pitch_rad: f64,
    pub roll_rad: f64,
}

/// Absolute camera placement.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CameraView {
    pub destination: Ecef,
    pub orientation: Orientation,
}

/// Reference frame the camera is currently expressed in.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum CameraFrame {
    /// Free camera in the Earth-fixed frame.
    World,
    /// Orbiting `focus`; user input would rotate around it.
    LookAt {
        focus: Ecef,
        offset: HeadingPitchRange,
    },
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Camera {
    pub eye: Ecef,
    pub orientation: Orientation,
    pub frame: CameraFrame,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            eye: Ecef::new(0.0, 0.0, 0.0),
            orientation: Orientation {
                heading_rad: 0.0,
                pitch_rad: -std::f64::consts::FRAC_PI_2,
                roll_rad: 0.0,
            },
            frame: CameraFrame::World,
        }
    }
}

impl Camera {
    pub fn set_view(&mut self, view: CameraView) {
        self.eye = view.destination;
        self.orientation = view.orientation;
        self.frame = CameraFrame::World;
    }

    pub fn look_at(&mut self, focus: Ecef, offset: HeadingPitchRange) {
        self.eye = offset.eye_from(focus);
        self.orientation = Orientation {
            heading_rad: offset.heading_rad,
            pitch_rad: offset.pitch_rad,
            roll_rad: 0.0,
        };
        self.frame = CameraFrame::LookAt { focus, offset };
    }

    /// Return to the world frame, keeping the current eye and orientation.
    pub fn detach(&mut self) {
        self.frame = CameraFrame::World;
    }

    pub fn focus(&self) -> Option<Ecef> {
        match self.frame {
            CameraFrame::LookAt { focus, .. } => Some(focus),
            CameraFrame::World => None,
        }
    }
}
