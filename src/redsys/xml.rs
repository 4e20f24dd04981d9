//! Flat XML helpers for gateway messages.
//!
//! Gateway answers are shallow documents of `<TAG>value</TAG>` pairs wrapped
//! in a single root element. [`parse_flat_xml`] turns one into a tag → value
//! map; [`extract_element_text`] pulls a single element's text out of a SOAP
//! envelope.

use std::collections::BTreeMap;

use quick_xml::events::Event;
use quick_xml::Reader;
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum XmlError {
    #[error("Malformed XML: {0}")]
    Syntax(#[from] quick_xml::Error),
    #[error("Malformed XML: {0}")]
    Structure(String),
}

/// Tag → value pairs of a gateway message. Tag names are stored upper case.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ResponseData(BTreeMap<String, String>);

impl ResponseData {
    /// Case-insensitive lookup.
    pub fn get(&self, tag: &str) -> Option<&str> {
        self.0.get(&tag.to_ascii_uppercase()).map(String::as_str)
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.0.contains_key(&tag.to_ascii_uppercase())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    fn insert(&mut self, tag: String, value: String) {
        self.0.insert(tag.to_ascii_uppercase(), value);
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ResponseData {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut data = ResponseData::default();
        for (k, v) in iter {
            data.insert(k.into(), v.into());
        }
        data
    }
}

fn element_name(bytes: &[u8]) -> Result<String, XmlError> {
    std::str::from_utf8(bytes)
        .map(str::to_string)
        .map_err(|e| XmlError::Structure(format!("element name is not UTF-8: {}", e)))
}

fn cdata_text(bytes: &[u8]) -> Result<String, XmlError> {
    std::str::from_utf8(bytes)
        .map(str::to_string)
        .map_err(|e| XmlError::Structure(format!("CDATA is not UTF-8: {}", e)))
}

/// Parses a flat document into a tag → value map.
///
/// The root element is skipped, as are elements whose trimmed text is empty.
/// Elements that only wrap other elements contribute nothing themselves, so
/// one level of grouping (e.g. `<OPERACION>`) is flattened away. When a tag
/// repeats, the last occurrence wins.
pub fn parse_flat_xml(xml: &str) -> Result<ResponseData, XmlError> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut open: Vec<(String, String)> = Vec::new();
    let mut seen_root = false;
    let mut data = ResponseData::default();

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                if open.is_empty() {
                    if seen_root {
                        return Err(XmlError::Structure(
                            "more than one root element".to_string(),
                        ));
                    }
                    seen_root = true;
                }
                open.push((element_name(e.local_name().as_ref())?, String::new()));
            }
            Event::Empty(_) => {
                if open.is_empty() {
                    if seen_root {
                        return Err(XmlError::Structure(
                            "more than one root element".to_string(),
                        ));
                    }
                    seen_root = true;
                }
            }
            Event::Text(t) => {
                let text = t.unescape()?;
                match open.last_mut() {
                    Some((_, buf)) => buf.push_str(&text),
                    None if text.trim().is_empty() => {}
                    None => {
                        return Err(XmlError::Structure(
                            "text outside of the root element".to_string(),
                        ))
                    }
                }
            }
            Event::CData(c) => {
                let text = cdata_text(&c.into_inner())?;
                if let Some((_, buf)) = open.last_mut() {
                    buf.push_str(&text);
                }
            }
            Event::End(_) => {
                let (name, text) = open
                    .pop()
                    .ok_or_else(|| XmlError::Structure("unexpected closing tag".to_string()))?;
                // the root has just been closed
                if open.is_empty() {
                    continue;
                }
                let value = text.trim();
                if !value.is_empty() {
                    data.insert(name, value.to_string());
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some((name, _)) = open.last() {
        return Err(XmlError::Structure(format!("unclosed element <{}>", name)));
    }
    if !seen_root {
        return Err(XmlError::Structure("no root element".to_string()));
    }

    Ok(data)
}

/// Returns the text content of the first element named `local_name`,
/// ignoring any namespace prefix. Escaped markup inside the element comes
/// back unescaped.
pub fn extract_element_text(xml: &str, local_name: &str) -> Result<Option<String>, XmlError> {
    let mut reader = Reader::from_str(xml);

    let mut depth = 0usize;
    let mut content: Option<String> = None;

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                if depth > 0 {
                    depth += 1;
                } else if e.local_name().as_ref() == local_name.as_bytes() {
                    depth = 1;
                    content = Some(String::new());
                }
            }
            Event::Empty(e) => {
                if depth == 0 && e.local_name().as_ref() == local_name.as_bytes() {
                    return Ok(Some(String::new()));
                }
            }
            Event::Text(t) if depth == 1 => {
                if let Some(buf) = content.as_mut() {
                    buf.push_str(&t.unescape()?);
                }
            }
            Event::CData(c) if depth == 1 => {
                let text = cdata_text(&c.into_inner())?;
                if let Some(buf) = content.as_mut() {
                    buf.push_str(&text);
                }
            }
            Event::End(_) if depth > 0 => {
                depth -= 1;
                if depth == 0 {
                    return Ok(content.map(|text| text.trim().to_string()));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if depth > 0 {
        return Err(XmlError::Structure(format!(
            "unclosed element <{}>",
            local_name
        )));
    }

    Ok(None)
}
