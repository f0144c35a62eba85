//! Commit interceptors
//!
//! The compositor's default commit handlers ignore windows hidden from the
//! pipeline, which would freeze a background window's content. For registered
//! windows the interceptors reveal the window only for the duration of the
//! original handler, so the commit is applied as usual while the window stays
//! hidden everywhere else.

use log::{trace, warn};
use std::cell::RefCell;
use std::rc::Rc;

use crate::background::BackgroundRegistry;
use crate::compositor::Compositor;
use crate::plugin::hooks::{SubsurfaceCommitFn, WindowCommitFn};
use crate::window::{Subsurface, WindowHandle};

/// Clears a window's hidden flag until dropped, then restores the previous value.
///
/// Restoration also runs during unwinding. It never panics: if the window is
/// still borrowed at that point the flag is left alone and a warning logged.
#[must_use = "the window is hidden again as soon as the guard is dropped"]
pub struct HiddenGuard {
    window: WindowHandle,
    previous: bool,
}

impl HiddenGuard {
    pub fn reveal(window: &WindowHandle) -> Self {
        let previous = std::mem::replace(&mut window.borrow_mut().hidden, false);
        Self {
            window: Rc::clone(window),
            previous,
        }
    }
}

impl Drop for HiddenGuard {
    fn drop(&mut self) {
        match self.window.try_borrow_mut() {
            Ok(mut window) => window.hidden = self.previous,
            Err(_) => warn!("Window still borrowed, hidden flag not restored"),
        }
    }
}

/// Replacement for the top-level surface commit handler
pub fn on_commit_window(
    compositor: &mut Compositor,
    registry: &RefCell<BackgroundRegistry>,
    window: &WindowHandle,
    original: WindowCommitFn,
) {
    if !registry.borrow().is_registered(window) {
        original(compositor, window);
        return;
    }

    let _revealed = HiddenGuard::reveal(window);
    original(compositor, window);
    invalidate_effects(compositor, window);
}

/// Replacement for the subsurface commit handler
pub fn on_commit_subsurface(
    compositor: &mut Compositor,
    registry: &RefCell<BackgroundRegistry>,
    subsurface: &Subsurface,
    original: SubsurfaceCommitFn,
) {
    let window = subsurface
        .window()
        .filter(|window| registry.borrow().is_registered(window));

    let Some(window) = window else {
        original(compositor, subsurface);
        return;
    };

    let _revealed = HiddenGuard::reveal(&window);
    original(compositor, subsurface);
    invalidate_effects(compositor, &window);
}

fn invalidate_effects(compositor: &mut Compositor, window: &WindowHandle) {
    let Some(output) = window.borrow().output else {
        return;
    };

    if compositor.output(output).is_some() {
        trace!("Marking blur dirty on {}", output);
        compositor.mark_blur_dirty_for_output(output);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{OutputConfig, WinwrapConfig};
    use crate::geometry::Vector2D;
    use crate::window::Buffer;
    use std::panic::{catch_unwind, AssertUnwindSafe};

    fn setup() -> (Compositor, RefCell<BackgroundRegistry>, WindowHandle) {
        let mut config = WinwrapConfig::default();
        config.outputs = vec![OutputConfig {
            name: "DP-1".to_string(),
            position: [0.0, 0.0],
            size: [1920.0, 1080.0],
        }];
        let mut compositor = Compositor::new(config);
        let registry = RefCell::new(BackgroundRegistry::new());
        let window = compositor.open_window("kitty-bg", "bg");
        crate::background::placement::on_new_window(&mut compositor, &registry, &window, "kitty-bg");
        (compositor, registry, window)
    }

    fn buffer(serial: u64) -> Buffer {
        Buffer {
            serial,
            size: Vector2D::new(1920.0, 1080.0),
        }
    }

    fn panicking_commit(_: &mut Compositor, _: &WindowHandle) {
        panic!("commit handler failed");
    }

    fn panicking_subsurface_commit(_: &mut Compositor, _: &Subsurface) {
        panic!("subsurface commit handler failed");
    }

    #[test]
    fn test_guard_restores_previous_value() {
        let (_, _, window) = setup();
        assert!(window.borrow().hidden);
        {
            let _guard = HiddenGuard::reveal(&window);
            assert!(!window.borrow().hidden);
        }
        assert!(window.borrow().hidden);

        window.borrow_mut().hidden = false;
        drop(HiddenGuard::reveal(&window));
        assert!(!window.borrow().hidden);
    }

    #[test]
    fn test_registered_commit_is_applied_while_hidden() {
        let (mut compositor, registry, window) = setup();
        let output = window.borrow().output.unwrap();
        compositor.render_frame();
        assert!(!compositor.effects().blur.is_dirty(output));

        window.borrow_mut().surface.attach(buffer(42));
        on_commit_window(
            &mut compositor,
            &registry,
            &window,
            crate::compositor::listener_commit_window,
        );

        let w = window.borrow();
        assert!(w.hidden);
        assert_eq!(w.surface.current.map(|b| b.serial), Some(42));
        assert!(compositor.effects().blur.is_dirty(output));
    }

    #[test]
    fn test_unregistered_commit_is_forwarded_unchanged() {
        let (mut compositor, registry, _) = setup();
        let other = compositor.open_window("foot", "shell");
        let output = other.borrow().output.unwrap();
        compositor.render_frame();

        other.borrow_mut().hidden = true;
        other.borrow_mut().surface.attach(buffer(1));
        on_commit_window(
            &mut compositor,
            &registry,
            &other,
            crate::compositor::listener_commit_window,
        );

        // The default handler drops commits of hidden windows
        assert_eq!(other.borrow().surface.current, None);
        assert!(other.borrow().hidden);
        assert!(!compositor.effects().blur.is_dirty(output));
    }

    #[test]
    fn test_subsurface_commit_of_registered_window() {
        let (mut compositor, registry, window) = setup();
        let sub = compositor.create_subsurface(&window);
        sub.surface.borrow_mut().attach(buffer(7));

        on_commit_subsurface(
            &mut compositor,
            &registry,
            &sub,
            crate::compositor::subsurface_on_commit,
        );

        assert_eq!(sub.surface.borrow().current.map(|b| b.serial), Some(7));
        assert!(window.borrow().hidden);
    }

    #[test]
    fn test_orphan_subsurface_is_forwarded() {
        let (mut compositor, registry, window) = setup();
        let sub = compositor.create_subsurface(&window);
        compositor.close_window(&window);
        drop(window);

        sub.surface.borrow_mut().attach(buffer(8));
        on_commit_subsurface(
            &mut compositor,
            &registry,
            &sub,
            crate::compositor::subsurface_on_commit,
        );
        assert_eq!(sub.surface.borrow().current.map(|b| b.serial), Some(8));
    }

    #[test]
    fn test_hidden_restored_when_original_panics() {
        let (mut compositor, registry, window) = setup();

        let result = catch_unwind(AssertUnwindSafe(|| {
            on_commit_window(&mut compositor, &registry, &window, panicking_commit);
        }));
        assert!(result.is_err());
        assert!(window.borrow().hidden);

        let sub = compositor.create_subsurface(&window);
        let result = catch_unwind(AssertUnwindSafe(|| {
            on_commit_subsurface(&mut compositor, &registry, &sub, panicking_subsurface_commit);
        }));
        assert!(result.is_err());
        assert!(window.borrow().hidden);
    }
}
