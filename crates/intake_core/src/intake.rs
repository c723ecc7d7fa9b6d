//! Normalizes picker selections and drag-and-drop gestures into one ordered
//! stream of candidate files.

use crate::validator::CandidateFile;

#[derive(Debug, Clone)]
pub enum IntakeEvent {
    PickerSelection(Vec<CandidateFile>),
    DragOver,
    DragLeave,
    Drop(Vec<CandidateFile>),
}

impl IntakeEvent {
    /// Drag gestures must stop the platform from opening the dropped file.
    pub fn suppresses_default(&self) -> bool {
        !matches!(self, Self::PickerSelection(_))
    }

    /// New state of the drop-zone highlight, if this event changes it.
    pub fn drop_highlight(&self) -> Option<bool> {
        match self {
            Self::DragOver => Some(true),
            Self::DragLeave | Self::Drop(_) => Some(false),
            Self::PickerSelection(_) => None,
        }
    }

    /// Candidates in user-selection order.
    pub fn into_candidates(self) -> Vec<CandidateFile> {
        match self {
            Self::PickerSelection(files) | Self::Drop(files) => files,
            Self::DragOver | Self::DragLeave => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(name: &str) -> CandidateFile {
        CandidateFile::new(name, "application/pdf", Vec::new())
    }

    #[test]
    fn picker_and_drop_preserve_order() {
        let files = vec![named("a.pdf"), named("b.pdf"), named("c.pdf")];
        for event in [
            IntakeEvent::PickerSelection(files.clone()),
            IntakeEvent::Drop(files.clone()),
        ] {
            let names: Vec<_> = event
                .into_candidates()
                .into_iter()
                .map(|file| file.name)
                .collect();
            assert_eq!(names, ["a.pdf", "b.pdf", "c.pdf"]);
        }
    }

    #[test]
    fn drag_events_suppress_default_and_toggle_highlight() {
        assert!(IntakeEvent::DragOver.suppresses_default());
        assert!(IntakeEvent::DragLeave.suppresses_default());
        assert!(IntakeEvent::Drop(Vec::new()).suppresses_default());
        assert!(!IntakeEvent::PickerSelection(Vec::new()).suppresses_default());

        assert_eq!(IntakeEvent::DragOver.drop_highlight(), Some(true));
        assert_eq!(IntakeEvent::DragLeave.drop_highlight(), Some(false));
        assert_eq!(IntakeEvent::Drop(Vec::new()).drop_highlight(), Some(false));
        assert_eq!(IntakeEvent::PickerSelection(Vec::new()).drop_highlight(), None);
        assert!(IntakeEvent::DragOver.into_candidates().is_empty());
    }
}
