//! Text format filter pipeline.
//!
//! Every text value that reaches markup goes through a pipeline selected by
//! its format name:
//! - plain_text: HTML-escapes all content, newlines become `<br>`
//! - filtered_html: sanitizes author HTML with ammonia
//!
//! Unknown format names get the plain text pipeline.

/// Trait for text filters in the pipeline.
pub trait TextFilter: Send + Sync {
    /// Filter name for debugging.
    fn name(&self) -> &str;

    /// Process the input text and return filtered output.
    fn process(&self, input: &str) -> String;
}

/// Pipeline of text filters applied in sequence.
pub struct FilterPipeline {
    filters: Vec<Box<dyn TextFilter>>,
}

impl FilterPipeline {
    /// Create a new empty pipeline.
    pub fn new() -> Self {
        Self {
            filters: Vec::new(),
        }
    }

    /// Add a filter to the pipeline.
    pub fn add<F: TextFilter + 'static>(mut self, filter: F) -> Self {
        self.filters.push(Box::new(filter));
        self
    }

    /// Create pipeline for a specific format.
    pub fn for_format(format: &str) -> Self {
        match format {
            "plain_text" => Self::plain_text(),
            "filtered_html" => Self::filtered_html(),
            _ => Self::plain_text(),
        }
    }

    /// Create a plain text pipeline (escapes all HTML).
    pub fn plain_text() -> Self {
        Self::new().add(HtmlEscapeFilter).add(NewlineFilter)
    }

    /// Create a filtered HTML pipeline (allows safe tags).
    pub fn filtered_html() -> Self {
        Self::new().add(SanitizeHtmlFilter)
    }

    /// Names of the filters in this pipeline, in order.
    pub fn filter_names(&self) -> Vec<&str> {
        self.filters.iter().map(|f| f.name()).collect()
    }

    /// Process text through all filters in the pipeline.
    pub fn process(&self, input: &str) -> String {
        self.filters
            .iter()
            .fold(input.to_string(), |acc, filter| filter.process(&acc))
    }
}

impl Default for FilterPipeline {
    fn default() -> Self {
        Self::plain_text()
    }
}

/// Escape the five HTML-significant characters.
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

/// Filter that escapes all HTML characters.
pub struct HtmlEscapeFilter;

impl TextFilter for HtmlEscapeFilter {
    fn name(&self) -> &str {
        "html_escape"
    }

    fn process(&self, input: &str) -> String {
        html_escape(input)
    }
}

/// Filter that converts newlines to <br> tags.
pub struct NewlineFilter;

impl TextFilter for NewlineFilter {
    fn name(&self) -> &str {
        "newline"
    }

    fn process(&self, input: &str) -> String {
        input.replace('\n', "<br>\n")
    }
}

/// Filter that strips dangerous markup while keeping formatting tags.
///
/// Removes `<script>`, `<style>`, event handler attributes, and
/// `javascript:` URLs.
pub struct SanitizeHtmlFilter;

impl TextFilter for SanitizeHtmlFilter {
    fn name(&self) -> &str {
        "filtered_html"
    }

    fn process(&self, input: &str) -> String {
        ammonia::clean(input)
    }
}
