//! Script Filter feedback in Alfred's XML schema
//!
//! ```xml
//! <?xml version="1.0"?>
//! <items>
//!   <item uid="rust" arg="" valid="no" autocomplete="rust ">
//!     <title>rust</title>
//!     <subtitle>12 bookmarks</subtitle>
//!     <icon>icon.png</icon>
//!   </item>
//! </items>
//! ```

use anyhow::{Context, Result};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::fmt;
use std::io::Write;

/// Title used when an item is added without one
pub const NO_RESULTS_TITLE: &str = "No results were found.";

/// Title of the item that reports a failure
pub const ERROR_TITLE: &str = "Error in generating results.";

const ERROR_ICON: &str =
    "/System/Library/CoreServices/CoreTypes.bundle/Contents/Resources/AlertStopIcon.icns";

/// Image file relative to the workflow bundle (or absolute)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Icon {
    pub path: String,
}

impl Icon {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

/// One result row
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Item {
    pub uid: Option<String>,
    pub arg: String,
    pub valid: Option<bool>,
    pub autocomplete: Option<String>,
    pub title: String,
    pub subtitle: String,
    pub icon: Option<Icon>,
}

impl Item {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn uid(mut self, uid: impl Into<String>) -> Self {
        self.uid = Some(uid.into());
        self
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.arg = arg.into();
        self
    }

    pub fn valid(mut self, valid: bool) -> Self {
        self.valid = Some(valid);
        self
    }

    pub fn autocomplete(mut self, autocomplete: impl Into<String>) -> Self {
        self.autocomplete = Some(autocomplete.into());
        self
    }

    pub fn subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.subtitle = subtitle.into();
        self
    }

    pub fn icon(mut self, icon: Icon) -> Self {
        self.icon = Some(icon);
        self
    }

    /// Alfred only autocompletes items that are not valid, so an item
    /// carrying an autocomplete string must be invalid and has no arg.
    pub fn make_valid(&mut self) {
        let has_autocomplete = self.autocomplete.as_deref().is_some_and(|a| !a.is_empty());
        if self.valid != Some(false) && has_autocomplete {
            self.valid = Some(false);
            self.arg.clear();
        }
    }
}

/// Collected Script Filter results
#[derive(Debug, Clone, Default)]
pub struct Feedback {
    items: Vec<Item>,
}

impl Feedback {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Append an item. An empty title becomes [`NO_RESULTS_TITLE`];
    /// with `check_valid` the item is passed through [`Item::make_valid`].
    pub fn add_item(&mut self, mut item: Item, check_valid: bool) {
        if item.title.is_empty() {
            item.title = NO_RESULTS_TITLE.to_string();
        }
        if check_valid {
            item.make_valid();
        }
        self.items.push(item);
    }

    /// Replace all results with a single error item
    pub fn make_error(&mut self, err: &dyn fmt::Display) {
        self.items.clear();
        self.add_item(
            Item::new(ERROR_TITLE)
                .subtitle(format!("{:#}", err))
                .valid(false)
                .icon(Icon::new(ERROR_ICON)),
            false,
        );
    }

    /// Render the results as Alfred XML
    pub fn to_xml(&self) -> Result<String> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);

        writer.write_event(Event::Decl(BytesDecl::new("1.0", None, None)))?;
        writer.write_event(Event::Start(BytesStart::new("items")))?;
        for item in &self.items {
            write_item(&mut writer, item)?;
        }
        writer.write_event(Event::End(BytesEnd::new("items")))?;

        String::from_utf8(writer.into_inner()).context("Alfred output is not valid UTF-8")
    }

    /// Write the XML to `out`. If rendering fails the results are
    /// replaced by an error item describing the failure.
    pub fn write_to<W: Write>(&mut self, mut out: W) -> Result<()> {
        let xml = match self.to_xml() {
            Ok(xml) => xml,
            Err(err) => {
                tracing::error!("Failed to render feedback: {:#}", err);
                self.make_error(&err);
                self.to_xml().context("Error in generating Alfred output")?
            }
        };

        out.write_all(xml.as_bytes())
            .context("Failed to write Alfred output")?;
        out.flush()?;
        Ok(())
    }
}

fn write_item<W: Write>(writer: &mut Writer<W>, item: &Item) -> Result<()> {
    let mut start = BytesStart::new("item");
    if let Some(uid) = item.uid.as_deref().filter(|u| !u.is_empty()) {
        start.push_attribute(("uid", uid));
    }
    start.push_attribute(("arg", item.arg.as_str()));
    if let Some(valid) = item.valid {
        start.push_attribute(("valid", if valid { "yes" } else { "no" }));
    }
    if let Some(autocomplete) = item.autocomplete.as_deref().filter(|a| !a.is_empty()) {
        start.push_attribute(("autocomplete", autocomplete));
    }

    writer.write_event(Event::Start(start))?;
    write_text_element(writer, BytesStart::new("title"), &item.title)?;
    write_text_element(writer, BytesStart::new("subtitle"), &item.subtitle)?;
    if let Some(icon) = &item.icon {
        write_text_element(writer, BytesStart::new("icon"), &icon.path)?;
    }
    writer.write_event(Event::End(BytesEnd::new("item")))?;

    Ok(())
}

fn write_text_element<W: Write>(
    writer: &mut Writer<W>,
    start: BytesStart<'_>,
    text: &str,
) -> Result<()> {
    if text.is_empty() {
        writer.write_event(Event::Empty(start))?;
        return Ok(());
    }

    let end = start.to_end().into_owned();
    writer.write_event(Event::Start(start))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(end))?;
    Ok(())
}
