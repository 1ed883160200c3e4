use std::fmt;

/// Per-frame verdict of the detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Status {
    #[default]
    Still,
    Motion,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Still => f.write_str("still"),
            Status::Motion => f.write_str("motion"),
        }
    }
}

/// Classify a frame from its contour areas, in contour order.
///
/// Each contour overwrites the status: above `min_area` is motion, anything
/// else is still. The frame therefore takes the status of the *last* contour,
/// even when an earlier one was large enough. No contours means still.
pub fn classify<I>(areas: I, min_area: f64) -> Status
where
    I: IntoIterator<Item = f64>,
{
    areas.into_iter().fold(Status::Still, |_, area| {
        if area > min_area {
            Status::Motion
        } else {
            Status::Still
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_contours_is_still() {
        assert_eq!(classify(std::iter::empty(), 4000.0), Status::Still);
    }

    #[test]
    fn large_last_contour_is_motion() {
        assert_eq!(classify([100.0, 5000.0], 4000.0), Status::Motion);
    }

    #[test]
    fn small_last_contour_overrides_earlier_motion() {
        assert_eq!(classify([9000.0, 100.0], 4000.0), Status::Still);
        assert_eq!(classify([5000.0, 4500.0, 12.0], 4000.0), Status::Still);
    }

    #[test]
    fn area_must_strictly_exceed_the_limit() {
        assert_eq!(classify([4000.0], 4000.0), Status::Still);
        assert_eq!(classify([4000.5], 4000.0), Status::Motion);
    }

    #[test]
    fn status_display() {
        assert_eq!(Status::Motion.to_string(), "motion");
        assert_eq!(Status::default().to_string(), "still");
    }
}
