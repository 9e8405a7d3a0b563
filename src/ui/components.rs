/// Reusable UI components for the panel chrome

use patternfly_yew::prelude::*;
use yew::prelude::*;

use crate::export::{sanitize_urls, Command};
use crate::host;
use crate::media::Pronunciation;
use crate::ui::dom;

#[derive(Properties, PartialEq)]
pub struct ControlBarProps {
    pub night_mode: bool,
    pub sidebar_open: bool,
    /// true grows the font one step, false shrinks it
    pub on_font_step: Callback<bool>,
    pub on_night_toggle: Callback<()>,
    pub on_sidebar_toggle: Callback<()>,
    pub on_close_all: Callback<()>,
}

#[function_component(ControlBar)]
pub fn control_bar(props: &ControlBarProps) -> Html {
    let grow = props.on_font_step.reform(|_: MouseEvent| true);
    let shrink = props.on_font_step.reform(|_: MouseEvent| false);
    let night = props.on_night_toggle.reform(|_: MouseEvent| ());
    let sidebar = props.on_sidebar_toggle.reform(|_: MouseEvent| ());
    let close_all = props.on_close_all.reform(|_: MouseEvent| ());

    html! {
        <div class="controlBar">
            <Button onclick={sidebar} variant={ButtonVariant::Secondary}>
                {if props.sidebar_open { "⇤" } else { "☰" }}
            </Button>
            <Button onclick={shrink} variant={ButtonVariant::Secondary}>{"A−"}</Button>
            <Button onclick={grow} variant={ButtonVariant::Secondary}>{"A+"}</Button>
            <Button onclick={night} variant={ButtonVariant::Secondary}>
                {if props.night_mode { "☀" } else { "☾" }}
            </Button>
            <Button onclick={close_all} variant={ButtonVariant::Danger}>{"Close All"}</Button>
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct PronunciationListProps {
    pub rows: Vec<Pronunciation>,
}

/// Pronunciation rows rendered into the audio container of a result pane.
/// Checked rows are read back through their `data-url` attribute at export
/// time, the same way selected images are.
#[function_component(PronunciationList)]
pub fn pronunciation_list(props: &PronunciationListProps) -> Html {
    let list_ref = use_node_ref();

    if props.rows.is_empty() {
        return html! { <div class="no-forvo">{"No Results Found."}</div> };
    }

    let on_download = {
        let list_ref = list_ref.clone();
        Callback::from(move |_: MouseEvent| {
            if let Some(root) = list_ref.cast::<web_sys::Element>() {
                let urls = sanitize_urls(dom::selected_audio_urls(&root));
                if !urls.is_empty() {
                    host::send(&Command::DownloadAudio { urls });
                }
            }
        })
    };

    html! {
        <div class="forvoList" ref={list_ref}>
            { for props.rows.iter().map(|row| {
                let url = row.url.clone();
                let on_play = Callback::from(move |_: MouseEvent| dom::play_audio(&url));
                html! {
                    <div class="audioRow" data-url={row.url.clone()}>
                        <Button size={ButtonSize::Small} onclick={on_play}>{"▶"}</Button>
                        <input type="checkbox" class="inCheckBox" />
                        <span class="audioSpeaker">{&row.speaker}</span>
                        <span class="audioOrigin">{&row.origin}</span>
                    </div>
                }
            }) }
            <Button onclick={on_download} variant={ButtonVariant::Secondary}>
                {"Download Selected"}
            </Button>
        </div>
    }
}
