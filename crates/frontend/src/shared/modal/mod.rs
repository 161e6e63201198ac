use leptos::ev;
use leptos::prelude::*;

/// Modal dialog with a header close button, Escape and overlay-click close.
///
/// While `close_locked` is true every close path is ignored and the close
/// button is disabled.
#[component]
pub fn Modal(
    /// Title of the modal
    #[prop(into)]
    title: String,
    /// Callback when modal should close
    on_close: Callback<()>,
    /// Blocks closing, e.g. while a request started from the modal is running
    #[prop(optional, into)]
    close_locked: Signal<bool>,
    /// Modal content
    children: Children,
) -> impl IntoView {
    let request_close = move || {
        if !close_locked.get_untracked() {
            on_close.run(());
        }
    };

    let escape = window_event_listener(ev::keydown, move |event: ev::KeyboardEvent| {
        if event.key() == "Escape" {
            request_close();
        }
    });
    on_cleanup(move || escape.remove());

    // Prevent click propagation from modal content
    let stop_propagation = move |ev: ev::MouseEvent| {
        ev.stop_propagation();
    };

    view! {
        <div class="modal-overlay" on:click=move |_| request_close()>
            <div class="modal modal--wide" on:click=stop_propagation>
                <div class="modal-header">
                    <h2 class="modal-title">{title}</h2>
                    <div class="modal-header-actions">
                        <button
                            class="button button--icon modal__close"
                            title="Close"
                            disabled=move || close_locked.get()
                            on:click=move |_| request_close()
                        >
                            "✕"
                        </button>
                    </div>
                </div>
                <div class="modal-body">
                    {children()}
                </div>
            </div>
        </div>
    }
}
