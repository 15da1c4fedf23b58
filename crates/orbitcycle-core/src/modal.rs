//! Machine detail modal.
//!
//! The modal's open state lives on the document (`machine-modal` without
//! the `hidden` class is open), so a host that toggles the class directly
//! stays consistent with the presenter.

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::catalog::{Catalog, MachineProfile};
use crate::document::Document;
use crate::id::{ElementId, MachineKey};

pub const MODAL_ID: &str = "machine-modal";
pub const MODAL_TITLE_ID: &str = "modal-title";
pub const MODAL_BODY_ID: &str = "modal-body";
pub const MODAL_CLOSE_ID: &str = "modal-close";

// ---------------------------------------------------------------------------
// Content
// ---------------------------------------------------------------------------

/// The rendered body of the modal, in display order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModalContent {
    pub title: String,
    pub subtitle: String,
    pub description: String,
    pub features: Vec<String>,
    /// `(label, value)` pairs of the specifications grid.
    pub specifications: Vec<(String, String)>,
    pub advantages: Vec<String>,
    pub limitations: Vec<String>,
}

impl ModalContent {
    pub fn from_profile(profile: &MachineProfile) -> Self {
        Self {
            title: profile.name.clone(),
            subtitle: profile.subtitle.clone(),
            description: profile.description.clone(),
            features: profile.features.clone(),
            specifications: profile
                .specifications
                .labeled()
                .iter()
                .map(|&(label, value)| (label.to_string(), value.to_string()))
                .collect(),
            advantages: profile.advantages.clone(),
            limitations: profile.limitations.clone(),
        }
    }

    /// Body markup with every text value HTML-escaped.
    pub fn to_html(&self) -> String {
        let mut html = String::new();
        html.push_str("<div class=\"machine-details\">");
        let _ = write!(
            html,
            "<div class=\"machine-detail-header\"><h4>{}</h4><p>{}</p></div>",
            escape_html(&self.subtitle),
            escape_html(&self.description)
        );

        html.push_str("<div class=\"detail-section\"><h5>Key Features</h5><ul>");
        for feature in &self.features {
            let _ = write!(html, "<li>{}</li>", escape_html(feature));
        }
        html.push_str("</ul></div>");

        html.push_str(
            "<div class=\"detail-section\"><h5>Technical Specifications</h5><div class=\"spec-grid\">",
        );
        for (label, value) in &self.specifications {
            let _ = write!(
                html,
                "<div class=\"spec-detail\"><strong>{}:</strong> {}</div>",
                escape_html(label),
                escape_html(value)
            );
        }
        html.push_str("</div></div>");

        html.push_str("<div class=\"detail-section\"><h5>Advantages</h5><ul class=\"advantages-list\">");
        for advantage in &self.advantages {
            let _ = write!(html, "<li class=\"advantage\">{}</li>", escape_html(advantage));
        }
        html.push_str("</ul></div>");

        html.push_str(
            "<div class=\"detail-section\"><h5>Limitations</h5><ul class=\"limitations-list\">",
        );
        for limitation in &self.limitations {
            let _ = write!(html, "<li class=\"limitation\">{}</li>", escape_html(limitation));
        }
        html.push_str("</ul></div></div>");
        html
    }
}

/// Escape the five HTML-significant characters.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Presenter
// ---------------------------------------------------------------------------

/// Opens and closes the detail modal and remembers what it shows.
#[derive(Debug, Clone, Default)]
pub struct ModalPresenter {
    showing: Option<MachineKey>,
    content: Option<ModalContent>,
}

impl ModalPresenter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the modal element is present and not hidden.
    pub fn is_open(&self, doc: &Document) -> bool {
        doc.get_element_by_id(MODAL_ID)
            .is_some_and(|m| !doc.has_class(m, "hidden"))
    }

    /// The machine most recently shown.
    pub fn showing(&self) -> Option<MachineKey> {
        self.showing
    }

    pub fn content(&self) -> Option<&ModalContent> {
        self.content.as_ref()
    }

    /// Render `key`'s profile and open the modal. Returns `false` when any
    /// modal element is missing.
    pub fn show(&mut self, doc: &mut Document, catalog: &Catalog, key: MachineKey) -> bool {
        let (Some(modal), Some(title), Some(body)) = (
            doc.get_element_by_id(MODAL_ID),
            doc.get_element_by_id(MODAL_TITLE_ID),
            doc.get_element_by_id(MODAL_BODY_ID),
        ) else {
            trace!(%key, "modal elements missing");
            return false;
        };

        let content = ModalContent::from_profile(catalog.get(key));
        doc.set_text(title, &content.title);
        doc.set_inner_html(body, content.to_html());
        doc.remove_class(modal, "hidden");

        self.showing = Some(key);
        self.content = Some(content);
        debug!(%key, "modal opened");
        true
    }

    /// Handle a click on a `.machine-details-btn`: resolve the enclosing
    /// card's `data-machine` and show it.
    pub fn show_for_button(
        &mut self,
        doc: &mut Document,
        catalog: &Catalog,
        button: ElementId,
    ) -> Option<MachineKey> {
        let card = doc.closest(button, "machine-card")?;
        let key: MachineKey = doc.attr(card, "data-machine")?.parse().ok()?;
        self.show(doc, catalog, key).then_some(key)
    }

    /// Hide the modal. Returns `true` only if it was open.
    pub fn close(&mut self, doc: &mut Document) -> bool {
        if !self.is_open(doc) {
            return false;
        }
        if let Some(modal) = doc.get_element_by_id(MODAL_ID) {
            doc.add_class(modal, "hidden");
        }
        debug!("modal closed");
        true
    }

    /// A click whose target is the modal element itself (the backdrop).
    pub fn on_backdrop_click(&mut self, doc: &mut Document, target: ElementId) -> bool {
        if doc.get_element_by_id(MODAL_ID) != Some(target) {
            return false;
        }
        self.close(doc)
    }

    /// Escape closes an open modal; everything else is ignored.
    pub fn on_key(&mut self, doc: &mut Document, key: &str) -> bool {
        key == "Escape" && self.close(doc)
    }
}
