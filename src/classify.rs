//! Control behavior classification
//!
//! A boolean telephony control can be wired three different ways, and the
//! host must interpret the decoded bit accordingly: a momentary push button
//! reports a transient impulse, a latching button has a rest state the host
//! debounces into a persistent on/off, and a mechanical switch reports its
//! absolute position. The descriptor attributes of a report item determine
//! which of these the control is; the category is computed once at parse
//! time and delivered with every decoded event.

use serde::{Deserialize, Serialize};

/// Electrical behavior of a boolean input control
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlCategory {
    /// Attributes missing or outside the known combinations
    Undefined,
    /// Momentary push button (transient impulse)
    OnOffButtons,
    /// Latching button with a preferred rest state
    ToggleButton,
    /// Mechanical switch reporting its absolute position
    ToggleSwitch,
}

impl ControlCategory {
    /// Category name as string
    pub fn name(self) -> &'static str {
        match self {
            ControlCategory::Undefined => "undefined",
            ControlCategory::OnOffButtons => "on_off_buttons",
            ControlCategory::ToggleButton => "toggle_button",
            ControlCategory::ToggleSwitch => "toggle_switch",
        }
    }
}

/// Classify a report item from its four descriptor attributes.
///
/// Any absent attribute yields `Undefined`. The table is exact; there is no
/// fallback beyond it.
pub fn classify(
    is_absolute: Option<bool>,
    has_preferred_state: Option<bool>,
    logical_min: Option<i32>,
    logical_max: Option<i32>,
) -> ControlCategory {
    let (Some(absolute), Some(preferred), Some(min), Some(max)) =
        (is_absolute, has_preferred_state, logical_min, logical_max)
    else {
        return ControlCategory::Undefined;
    };

    match (absolute, preferred, min, max) {
        (false, false, -1, 1) => ControlCategory::OnOffButtons,
        (false, true, 0, 1) => ControlCategory::ToggleButton,
        (true, false, 0, 1) => ControlCategory::ToggleSwitch,
        _ => ControlCategory::Undefined,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_momentary_button() {
        assert_eq!(
            classify(Some(false), Some(false), Some(-1), Some(1)),
            ControlCategory::OnOffButtons
        );
    }

    #[test]
    fn test_latching_button() {
        assert_eq!(
            classify(Some(false), Some(true), Some(0), Some(1)),
            ControlCategory::ToggleButton
        );
    }

    #[test]
    fn test_mechanical_switch() {
        assert_eq!(
            classify(Some(true), Some(false), Some(0), Some(1)),
            ControlCategory::ToggleSwitch
        );
    }

    #[test]
    fn test_missing_attribute() {
        assert_eq!(
            classify(None, Some(false), Some(0), Some(1)),
            ControlCategory::Undefined
        );
        assert_eq!(
            classify(Some(true), None, Some(0), Some(1)),
            ControlCategory::Undefined
        );
        assert_eq!(
            classify(Some(true), Some(false), None, Some(1)),
            ControlCategory::Undefined
        );
        assert_eq!(
            classify(Some(true), Some(false), Some(0), None),
            ControlCategory::Undefined
        );
    }

    #[test]
    fn test_unknown_combinations() {
        // Preferred-state switch is not in the table
        assert_eq!(
            classify(Some(true), Some(true), Some(0), Some(1)),
            ControlCategory::Undefined
        );
        // Ranges outside 0/1 or -1/1
        assert_eq!(
            classify(Some(false), Some(false), Some(0), Some(127)),
            ControlCategory::Undefined
        );
        assert_eq!(
            classify(Some(true), Some(false), Some(-1), Some(1)),
            ControlCategory::Undefined
        );
    }

    #[test]
    fn test_each_combination_maps_to_one_category() {
        // Every (absolute, preferred) pair over the two observed ranges must
        // classify deterministically to exactly one category.
        for absolute in [false, true] {
            for preferred in [false, true] {
                for (min, max) in [(-1, 1), (0, 1)] {
                    let first = classify(Some(absolute), Some(preferred), Some(min), Some(max));
                    let second = classify(Some(absolute), Some(preferred), Some(min), Some(max));
                    assert_eq!(first, second);
                }
            }
        }
    }
}
