use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::ParseError;
use crate::pipeline::parse::{gpx, tcx, Parser, RawActivity};

/// Shared front end for the XML formats. The root element decides whether the
/// document is read as GPX or TCX, whatever the file extension said.
pub struct XmlParser;

impl Parser for XmlParser {
    fn parse(&self, filename: &str, bytes: &[u8]) -> Result<Vec<RawActivity>, ParseError> {
        let text = std::str::from_utf8(bytes)
            .map_err(|e| ParseError::DecodeError(format!("Invalid UTF-8: {}", e)))?;

        let root = parse_document(text)?.ok_or_else(|| {
            ParseError::MalformedDocument("Document has no root element".to_string())
        })?;

        match root.name.as_str() {
            "gpx" => gpx::read_gpx(&root),
            "TrainingCenterDatabase" => tcx::read_tcx(&root, filename),
            other => Err(ParseError::MalformedDocument(format!(
                "Unexpected root element <{}>",
                other
            ))),
        }
    }
}

/// Element of the attributed tag tree. Names are local names, so namespace
/// prefixes such as `ns3:` are already stripped.
#[derive(Debug, Clone, Default)]
pub struct XmlElement {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<XmlElement>,
    pub text: String,
}

impl XmlElement {
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn child(&self, name: &str) -> Option<&XmlElement> {
        self.children.iter().find(|c| c.name == name)
    }

    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlElement> {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// Follows a chain of child names, taking the first match at each level.
    pub fn path(&self, names: &[&str]) -> Option<&XmlElement> {
        names.iter().try_fold(self, |el, name| el.child(name))
    }

    /// Trimmed text of the named child, if it has any.
    pub fn child_text(&self, name: &str) -> Option<&str> {
        self.child(name)
            .map(|c| c.text.trim())
            .filter(|t| !t.is_empty())
    }
}

pub fn parse_document(text: &str) -> Result<Option<XmlElement>, ParseError> {
    let mut reader = Reader::from_reader(text.as_bytes());
    reader.trim_text(true);

    let mut stack: Vec<XmlElement> = Vec::new();
    let mut root: Option<XmlElement> = None;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => stack.push(element_from_start(&e)?),
            Ok(Event::Empty(e)) => {
                let element = element_from_start(&e)?;
                attach(&mut stack, &mut root, element);
            }
            Ok(Event::End(_)) => {
                let element = stack.pop().ok_or_else(|| {
                    ParseError::DecodeError("Unbalanced closing tag".to_string())
                })?;
                attach(&mut stack, &mut root, element);
            }
            Ok(Event::Text(e)) => {
                if let Some(current) = stack.last_mut() {
                    let text = e
                        .unescape()
                        .map_err(|e| ParseError::DecodeError(e.to_string()))?;
                    current.text.push_str(&text);
                }
            }
            Ok(Event::CData(e)) => {
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&String::from_utf8_lossy(&e.into_inner()));
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(ParseError::DecodeError(e.to_string())),
            _ => {}
        }
        buf.clear();
    }

    if !stack.is_empty() {
        return Err(ParseError::DecodeError(
            "Unexpected end of document".to_string(),
        ));
    }

    Ok(root)
}

fn attach(stack: &mut [XmlElement], root: &mut Option<XmlElement>, element: XmlElement) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None => {
            if root.is_none() {
                *root = Some(element);
            }
        }
    }
}

fn element_from_start(e: &BytesStart) -> Result<XmlElement, ParseError> {
    let name = std::str::from_utf8(e.local_name().as_ref())
        .map_err(|e| ParseError::DecodeError(e.to_string()))?
        .to_string();

    let mut attributes = Vec::new();
    for attr in e.attributes() {
        let attr = attr.map_err(|e| ParseError::DecodeError(e.to_string()))?;
        let key = std::str::from_utf8(attr.key.local_name().as_ref())
            .map_err(|e| ParseError::DecodeError(e.to_string()))?
            .to_string();
        let value = attr
            .unescape_value()
            .map_err(|e| ParseError::DecodeError(e.to_string()))?
            .into_owned();
        attributes.push((key, value));
    }

    Ok(XmlElement {
        name,
        attributes,
        children: Vec::new(),
        text: String::new(),
    })
}
