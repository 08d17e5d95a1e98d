//! Read-only message view showing decoded FastInfoset bodies.
use std::ops::Range;

use crate::{
    error::DecodeError,
    http::Direction,
    message,
    pipeline::{DecodePipeline, PipelineConfig},
};

/// View of one HTTP message inside a host message editor.
pub trait MessageTab {
    /// Title shown for the view.
    fn caption(&self) -> &str;

    /// Returns whether the view can show the message.
    fn is_enabled(&self, content: &[u8], direction: Direction) -> bool;

    /// Shows the message, or clears the view for `None`.
    ///
    /// When the message cannot be shown, the view keeps the previous message.
    fn set_message(
        &mut self,
        content: Option<&[u8]>,
        direction: Direction,
    ) -> Result<(), DecodeError>;

    /// Returns the message last shown by [`Self::set_message()`].
    fn message(&self) -> Option<&[u8]>;

    /// Returns whether the user changed the message.
    fn is_modified(&self) -> bool;

    /// Returns the part of the displayed text selected by the user.
    fn selected_data(&self) -> Option<&[u8]>;
}

/// Extension registering [`FastInfosetTab`] views.
#[derive(Debug, Clone, Default)]
pub struct Extension {
    config: PipelineConfig,
}

impl Extension {
    pub const NAME: &'static str = "XML Fast Infoset Decoder";

    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    pub fn name(&self) -> &str {
        Self::NAME
    }

    /// Creates the view for one message editor.
    ///
    /// Views are read-only whether or not the editor is editable.
    pub fn create_tab(&self, editable: bool) -> FastInfosetTab {
        tracing::debug!(editable, "create tab");

        FastInfosetTab::new(DecodePipeline::new(self.config))
    }
}

/// Shows a FastInfoset body as indented XML.
#[derive(Debug, Clone, Default)]
pub struct FastInfosetTab {
    pipeline: DecodePipeline,
    message: Option<Vec<u8>>,
    text: Vec<u8>,
    selection: Option<Range<usize>>,
    last_error: Option<String>,
}

impl FastInfosetTab {
    pub const CAPTION: &'static str = "FastInfoSet XML";

    pub fn new(pipeline: DecodePipeline) -> Self {
        Self {
            pipeline,
            ..Default::default()
        }
    }

    /// Returns the displayed text.
    pub fn text(&self) -> &[u8] {
        &self.text
    }

    /// Returns the message of the last decode failure.
    ///
    /// Cleared once a message is shown.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Sets the range of the displayed text selected by the user.
    pub fn select(&mut self, range: Range<usize>) {
        self.selection = Some(range);
    }

    pub fn clear_selection(&mut self) {
        self.selection = None;
    }
}

impl MessageTab for FastInfosetTab {
    fn caption(&self) -> &str {
        Self::CAPTION
    }

    fn is_enabled(&self, content: &[u8], direction: Direction) -> bool {
        message::is_applicable(content, direction)
    }

    fn set_message(
        &mut self,
        content: Option<&[u8]>,
        direction: Direction,
    ) -> Result<(), DecodeError> {
        let Some(content) = content else {
            self.message = None;
            self.text.clear();
            self.selection = None;
            self.last_error = None;
            return Ok(());
        };

        match self.pipeline.decode_message(content, direction) {
            Ok(text) => {
                self.message = Some(content.to_vec());
                self.text = text;
                self.selection = None;
                self.last_error = None;
                Ok(())
            }
            Err(error) => {
                tracing::debug!(%error, "message not shown");
                self.last_error = Some(error.to_string());
                Err(error)
            }
        }
    }

    fn message(&self) -> Option<&[u8]> {
        self.message.as_deref()
    }

    fn is_modified(&self) -> bool {
        false
    }

    fn selected_data(&self) -> Option<&[u8]> {
        let range = self.selection.clone()?;

        self.text.get(range)
    }
}
