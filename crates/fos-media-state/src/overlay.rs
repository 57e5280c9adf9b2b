//! Fullscreen and Picture-in-Picture membership
//!
//! Elements, overlay contexts (the document and nested shadow roots), and
//! the resolution of "is this element the active overlay" across nested
//! encapsulated contexts.

use std::sync::Arc;

use crate::device::{DeviceRequest, PresentationMode};
use crate::event::EventTarget;
use crate::owners::StateOwners;

/// Nesting depth at which overlay resolution gives up
pub const MAX_OVERLAY_DEPTH: usize = 32;

/// Element identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementId(pub u64);

/// A presentable element
pub trait HostElement: Send + Sync {
    fn element_id(&self) -> ElementId;

    /// Custom element that encapsulates its own shadow context
    fn is_composite(&self) -> bool { false }

    /// Native media surface (video/audio element)
    fn is_media_surface(&self) -> bool { false }

    fn shadow_root(&self) -> Option<Arc<dyn OverlayContext>> { None }

    /// Composed-tree containment, crossing shadow boundaries
    fn contains_composed(&self, other: ElementId) -> bool;

    /// `None` when the element has no fullscreen request API
    fn request_fullscreen(&self) -> Option<DeviceRequest> { None }

    /// Settles once a composite element has been upgraded
    fn when_defined(&self) -> Option<DeviceRequest> { None }
}

/// A level that tracks its own active overlay elements
pub trait OverlayContext: Send + Sync {
    fn fullscreen_element(&self) -> Option<Arc<dyn HostElement>>;

    fn picture_in_picture_element(&self) -> Option<Arc<dyn HostElement>>;

    /// Whether this level exposes the per-level accessors above
    fn exposes_overlay_elements(&self) -> bool { true }
}

/// Top-level document context
pub trait RootContext: OverlayContext + EventTarget {
    /// `None` when the context cannot exit fullscreen
    fn exit_fullscreen(&self) -> Option<DeviceRequest> { None }

    fn exit_picture_in_picture(&self) -> Option<DeviceRequest> { None }
}

/// Overlay flavour
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayKind {
    Fullscreen,
    PictureInPicture,
}

impl OverlayKind {
    fn active_in(self, context: &dyn OverlayContext) -> Option<Arc<dyn HostElement>> {
        match self {
            OverlayKind::Fullscreen => context.fullscreen_element(),
            OverlayKind::PictureInPicture => context.picture_in_picture_element(),
        }
    }
}

/// Walk the active-overlay chain below `active`, layer by layer.
///
/// Falls back to composed containment when `active` has no nested context
/// or the nested context does not expose per-level accessors.
pub fn nested_overlay_matches(active: &dyn HostElement, target: ElementId, kind: OverlayKind) -> bool {
    let mut context = match active.shadow_root() {
        Some(context) if context.exposes_overlay_elements() => context,
        _ => return active.contains_composed(target),
    };

    for _ in 0..MAX_OVERLAY_DEPTH {
        let Some(element) = kind.active_in(context.as_ref()) else {
            return false;
        };
        if element.element_id() == target {
            return true;
        }
        match element.shadow_root() {
            Some(next) => context = next,
            None => return false,
        }
    }

    tracing::warn!(
        "{:?} chain deeper than {} levels, treating as inactive",
        kind,
        MAX_OVERLAY_DEPTH
    );
    false
}

/// Whether the overlay target (or the device) is the active fullscreen element
pub fn is_fullscreen(owners: &StateOwners) -> bool {
    let (Some(media), Some(document)) = (&owners.media, &owners.document) else {
        return false;
    };

    let Some(active) = document.fullscreen_element() else {
        // Mobile video fullscreen never shows up on the document
        return media.legacy_fullscreen().is_some_and(|legacy| {
            legacy.displaying_fullscreen()
                && legacy.presentation_mode() == Some(PresentationMode::Fullscreen)
        });
    };

    let media_id = owners.media_element_id();
    let Some(target) = owners.overlay_target_id() else {
        return false;
    };
    let active_id = active.element_id();
    if active_id == target || Some(active_id) == media_id {
        return true;
    }

    active.is_composite() && nested_overlay_matches(active.as_ref(), target, OverlayKind::Fullscreen)
}

/// Whether the device is the active picture-in-picture element
pub fn is_picture_in_picture(owners: &StateOwners) -> bool {
    let (Some(media), Some(document)) = (&owners.media, &owners.document) else {
        return false;
    };
    let Some(active) = document.picture_in_picture_element() else {
        return false;
    };
    let Some(element) = media.element() else {
        return false;
    };

    let target = element.element_id();
    if active.element_id() == target {
        return true;
    }
    if active.is_media_surface() {
        // The native surface inside a composite device
        return element.is_composite() && element.contains_composed(active.element_id());
    }
    if active.is_composite() {
        return nested_overlay_matches(active.as_ref(), target, OverlayKind::PictureInPicture);
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulated::{SimulatedDocument, SimulatedElement, SimulatedMedia, SimulatedShadowRoot};

    #[test]
    fn test_nested_match_two_levels() {
        let target = SimulatedElement::new(3);
        let inner = SimulatedElement::composite(2);
        inner.shadow().set_fullscreen_element(Some(target.clone()));
        let outer = SimulatedElement::composite(1);
        outer.shadow().set_fullscreen_element(Some(inner.clone()));

        assert!(nested_overlay_matches(outer.as_ref(), ElementId(3), OverlayKind::Fullscreen));
        assert!(!nested_overlay_matches(outer.as_ref(), ElementId(9), OverlayKind::Fullscreen));
        assert!(!nested_overlay_matches(
            outer.as_ref(),
            ElementId(3),
            OverlayKind::PictureInPicture
        ));
    }

    #[test]
    fn test_containment_fallback() {
        let outer = SimulatedElement::composite(1);
        outer.set_shadow_root(Arc::new(SimulatedShadowRoot::opaque()));
        outer.add_descendant(ElementId(5));

        assert!(nested_overlay_matches(outer.as_ref(), ElementId(5), OverlayKind::Fullscreen));
        assert!(!nested_overlay_matches(outer.as_ref(), ElementId(6), OverlayKind::Fullscreen));
    }

    #[test]
    fn test_cyclic_chain_is_bounded() {
        let looping = SimulatedElement::composite(1);
        looping.shadow().set_fullscreen_element(Some(looping.clone()));

        assert!(!nested_overlay_matches(looping.as_ref(), ElementId(2), OverlayKind::Fullscreen));
    }

    #[test]
    fn test_legacy_fullscreen_requires_fullscreen_mode() {
        let media = SimulatedMedia::new(1);
        media.enable_legacy_fullscreen();
        let owners = StateOwners::new()
            .with_media(media.clone())
            .with_document(SimulatedDocument::new());

        media.set_legacy_presentation(true, Some(PresentationMode::PictureInPicture));
        assert!(!is_fullscreen(&owners));

        media.set_legacy_presentation(true, Some(PresentationMode::Inline));
        assert!(!is_fullscreen(&owners));

        media.set_legacy_presentation(false, Some(PresentationMode::Fullscreen));
        assert!(!is_fullscreen(&owners));

        media.set_legacy_presentation(true, Some(PresentationMode::Fullscreen));
        assert!(is_fullscreen(&owners));
    }
}
