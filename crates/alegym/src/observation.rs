//! Observation kinds and the reusable observation buffer.

use crate::emulator::Emulator;
use crate::spaces::Box as BoxSpace;
use crate::{AleError, Result};
use ndarray::{Array3, ArrayD, ArrayViewD, IxDyn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// What an observation contains.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObsType {
    /// Screen as `(height, width, 3)` RGB
    #[default]
    Rgb,
    /// Screen as `(height, width, 1)` luminance
    Grayscale,
    /// Console RAM as `(ram_size,)`
    Ram,
}

impl ObsType {
    /// Observation shape for `emulator`'s reported dimensions.
    pub fn shape<E: Emulator + ?Sized>(self, emulator: &E) -> Vec<usize> {
        match self {
            ObsType::Ram => vec![emulator.ram_size()],
            ObsType::Rgb | ObsType::Grayscale => {
                let (height, width) = emulator.screen_dims();
                vec![height, width, self.channels()]
            }
        }
    }

    /// Image channel count (1 for RAM, which has no channel axis).
    pub fn channels(self) -> usize {
        match self {
            ObsType::Rgb => 3,
            ObsType::Grayscale | ObsType::Ram => 1,
        }
    }

    pub fn space<E: Emulator + ?Sized>(self, emulator: &E) -> BoxSpace {
        BoxSpace::bytes(&self.shape(emulator))
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ObsType::Rgb => "rgb",
            ObsType::Grayscale => "grayscale",
            ObsType::Ram => "ram",
        }
    }
}

impl FromStr for ObsType {
    type Err = AleError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "rgb" => Ok(ObsType::Rgb),
            "grayscale" => Ok(ObsType::Grayscale),
            "ram" => Ok(ObsType::Ram),
            other => Err(AleError::Config(format!(
                "invalid observation type: {}, expecting: rgb, grayscale, ram",
                other
            ))),
        }
    }
}

impl fmt::Display for ObsType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Single pre-allocated observation slot.
///
/// The allocation never changes after construction; `fill` overwrites it in
/// place. Callers get an immutable view and must copy it to keep history.
#[derive(Debug)]
pub struct ObservationBuffer {
    obs_type: ObsType,
    data: ArrayD<u8>,
}

impl ObservationBuffer {
    /// Allocate a zeroed buffer sized from the emulator's dimensions.
    pub fn allocate<E: Emulator + ?Sized>(obs_type: ObsType, emulator: &E) -> Self {
        let shape = obs_type.shape(emulator);
        Self {
            obs_type,
            data: ArrayD::zeros(IxDyn(&shape)),
        }
    }

    /// Copy the current emulator state into the buffer.
    pub fn fill<E: Emulator + ?Sized>(&mut self, emulator: &E) -> Result<()> {
        let obs_type = self.obs_type;
        let out = self.bytes_mut()?;
        match obs_type {
            ObsType::Ram => emulator.get_ram(out),
            ObsType::Rgb => emulator.get_screen_rgb(out),
            ObsType::Grayscale => emulator.get_screen_grayscale(out),
        }
    }

    pub fn obs_type(&self) -> ObsType {
        self.obs_type
    }

    pub fn shape(&self) -> &[usize] {
        self.data.shape()
    }

    pub fn view(&self) -> ArrayViewD<'_, u8> {
        self.data.view()
    }

    /// Start of the underlying allocation; stable for the buffer's lifetime.
    pub fn as_ptr(&self) -> *const u8 {
        self.data.as_ptr()
    }

    fn bytes_mut(&mut self) -> Result<&mut [u8]> {
        let shape = self.data.shape().to_vec();
        self.data
            .as_slice_mut()
            .ok_or(AleError::ShapeMismatch {
                expected: shape,
                actual: Vec::new(),
            })
    }
}

/// Render a fresh RGB frame regardless of the configured observation kind.
pub fn render_rgb<E: Emulator + ?Sized>(emulator: &E) -> Result<Array3<u8>> {
    let (height, width) = emulator.screen_dims();
    let mut frame = Array3::zeros((height, width, 3));
    match frame.as_slice_mut() {
        Some(out) => emulator.get_screen_rgb(out)?,
        None => {
            return Err(AleError::ShapeMismatch {
                expected: vec![height, width, 3],
                actual: Vec::new(),
            })
        }
    }
    Ok(frame)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::Action;
    use std::path::Path;

    /// Emulator with a 2x3 screen and 4 bytes of RAM whose contents count fills.
    #[derive(Default)]
    struct TinyScreen {
        fills: std::cell::Cell<u8>,
    }

    impl Emulator for TinyScreen {
        fn load_rom(&mut self, _path: &Path) -> Result<()> {
            Ok(())
        }
        fn reset_game(&mut self) -> Result<()> {
            Ok(())
        }
        fn act(&mut self, _action: Action) -> Result<f32> {
            Ok(0.0)
        }
        fn game_over(&self) -> bool {
            false
        }
        fn lives(&self) -> i32 {
            0
        }
        fn legal_action_set(&self) -> Vec<Action> {
            Action::ALL.to_vec()
        }
        fn minimal_action_set(&self) -> Vec<Action> {
            vec![Action::Noop]
        }
        fn ram_size(&self) -> usize {
            4
        }
        fn get_ram(&self, out: &mut [u8]) -> Result<()> {
            self.fills.set(self.fills.get() + 1);
            out.fill(self.fills.get());
            Ok(())
        }
        fn screen_dims(&self) -> (usize, usize) {
            (2, 3)
        }
        fn get_screen_rgb(&self, out: &mut [u8]) -> Result<()> {
            assert_eq!(out.len(), 2 * 3 * 3);
            out.fill(200);
            Ok(())
        }
        fn get_screen_grayscale(&self, out: &mut [u8]) -> Result<()> {
            assert_eq!(out.len(), 2 * 3);
            out.fill(100);
            Ok(())
        }
        fn set_int(&mut self, _key: &str, _value: i32) -> Result<()> {
            Ok(())
        }
        fn set_float(&mut self, _key: &str, _value: f32) -> Result<()> {
            Ok(())
        }
        fn set_bool(&mut self, _key: &str, _value: bool) -> Result<()> {
            Ok(())
        }
        fn set_mode(&mut self, _mode: u32) -> Result<()> {
            Ok(())
        }
        fn set_difficulty(&mut self, _difficulty: u32) -> Result<()> {
            Ok(())
        }
        fn is_supported_rom(&self, _path: &Path) -> Option<String> {
            None
        }
    }

    #[test]
    fn test_shapes() {
        let emu = TinyScreen::default();
        assert_eq!(ObsType::Ram.shape(&emu), vec![4]);
        assert_eq!(ObsType::Rgb.shape(&emu), vec![2, 3, 3]);
        assert_eq!(ObsType::Grayscale.shape(&emu), vec![2, 3, 1]);
    }

    #[test]
    fn test_fill_reuses_allocation() {
        let emu = TinyScreen::default();
        let mut buf = ObservationBuffer::allocate(ObsType::Ram, &emu);
        let ptr = buf.as_ptr();
        buf.fill(&emu).unwrap();
        assert_eq!(buf.view().iter().copied().collect::<Vec<_>>(), vec![1; 4]);
        buf.fill(&emu).unwrap();
        assert_eq!(buf.view().iter().copied().collect::<Vec<_>>(), vec![2; 4]);
        assert_eq!(buf.as_ptr(), ptr);
        assert_eq!(buf.shape(), &[4]);
    }

    #[test]
    fn test_fill_dispatches_on_kind() {
        let emu = TinyScreen::default();
        let mut gray = ObservationBuffer::allocate(ObsType::Grayscale, &emu);
        gray.fill(&emu).unwrap();
        assert!(gray.view().iter().all(|&v| v == 100));

        let mut rgb = ObservationBuffer::allocate(ObsType::Rgb, &emu);
        rgb.fill(&emu).unwrap();
        assert!(rgb.view().iter().all(|&v| v == 200));
    }

    #[test]
    fn test_render_rgb() {
        let emu = TinyScreen::default();
        let frame = render_rgb(&emu).unwrap();
        assert_eq!(frame.shape(), &[2, 3, 3]);
    }

    #[test]
    fn test_parse_obs_type() {
        assert_eq!("ram".parse::<ObsType>().unwrap(), ObsType::Ram);
        assert_eq!("grayscale".parse::<ObsType>().unwrap(), ObsType::Grayscale);
        assert!("rgb_array".parse::<ObsType>().is_err());
        assert_eq!(ObsType::Rgb.to_string(), "rgb");
    }
}
