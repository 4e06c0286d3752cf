use serde::{Deserialize, Serialize};

/// At most one of `into_view` / `out_of_view` is `None` for a real navigation.
/// The reset descriptor produced when a vacated slot forgets its state has
/// both set to `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionDescriptor<R> {
    pub into_view: Option<R>,
    pub out_of_view: Option<R>,
    pub is_entering_active: bool,
    pub backwards: bool,
    pub first_render: bool,
}

impl<R> TransitionDescriptor<R> {
    pub fn new(
        into_view: Option<R>,
        out_of_view: Option<R>,
        is_entering_active: bool,
        backwards: bool,
        first_render: bool,
    ) -> Self {
        Self {
            into_view,
            out_of_view,
            is_entering_active,
            backwards,
            first_render,
        }
    }

    pub fn reset(&self) -> Self {
        Self {
            into_view: None,
            out_of_view: None,
            is_entering_active: self.is_entering_active,
            backwards: self.backwards,
            first_render: self.first_render,
        }
    }

    pub fn is_reset(&self) -> bool {
        self.into_view.is_none() && self.out_of_view.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_clears_views_and_keeps_flags() {
        let descriptor = TransitionDescriptor::new(Some("/a"), Some("/b"), false, true, false);
        let reset = descriptor.reset();

        assert!(reset.is_reset());
        assert!(!reset.is_entering_active);
        assert!(reset.backwards);
        assert!(!reset.first_render);
        assert!(!descriptor.is_reset());
    }

    #[test]
    fn serializes_missing_views_as_null() {
        let descriptor: TransitionDescriptor<String> =
            TransitionDescriptor::new(Some("/home".into()), None, true, false, true);
        let value = serde_json::to_value(&descriptor).expect("serialize");

        assert_eq!(value["into_view"], "/home");
        assert!(value["out_of_view"].is_null());
        assert_eq!(value["first_render"], true);
    }
}
