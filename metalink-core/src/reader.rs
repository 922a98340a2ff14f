//! Tokenizer adapter: drives the state machine from quick-xml events.
//!
//! All I/O and XML well-formedness checking lives here, outside the core.
//! The adapter converts the pull-based `quick_xml::Reader` stream into the
//! push callbacks the [`StateMachine`] expects, and pairs each start/end
//! with a [`TextAccumulator`] scope so end events see their element's full
//! character content regardless of fragmentation.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use quick_xml::events::{BytesStart, Event as XmlEvent};
use quick_xml::name::QName;
use quick_xml::Reader;

use crate::error::{ErrorCode, ParseError};
use crate::event::{Attributes, ElementHandler};
use crate::model::Metalink;
use crate::state::StateMachine;
use crate::text::TextAccumulator;

/// Parse a Metalink document from an in-memory string.
pub fn parse_str(xml: &str) -> Result<Metalink, ParseError> {
    parse_reader(xml.as_bytes())
}

/// Parse a Metalink document from a file on disk.
pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Metalink, ParseError> {
    let file = File::open(path).map_err(ParseError::tokenizer)?;
    parse_reader(BufReader::new(file))
}

/// Parse a Metalink document from any buffered reader.
///
/// Tokenizer-level errors take precedence over builder-level ones: a
/// syntax error aborts immediately even if the state machine had already
/// recorded a sticky code.
pub fn parse_reader<R: BufRead>(reader: R) -> Result<Metalink, ParseError> {
    let mut xml = Reader::from_reader(reader);
    let mut machine = StateMachine::new();
    let mut text = TextAccumulator::new();
    let mut buf = Vec::new();

    loop {
        match xml.read_event_into(&mut buf) {
            Ok(XmlEvent::Start(e)) => {
                let name = local_name(e.name());
                let attrs = collect_attributes(&e)?;
                text.enter();
                machine.on_element_start(&name, &attrs);
            }
            Ok(XmlEvent::Empty(e)) => {
                // Self-closing element: a start immediately followed by an
                // end with empty text.
                let name = local_name(e.name());
                let attrs = collect_attributes(&e)?;
                text.enter();
                machine.on_element_start(&name, &attrs);
                let content = text.exit();
                machine.on_element_end(&name, &content);
            }
            Ok(XmlEvent::End(e)) => {
                let name = local_name(e.name());
                let content = text.exit();
                machine.on_element_end(&name, &content);
            }
            Ok(XmlEvent::Text(e)) => {
                let fragment = e.unescape().map_err(ParseError::tokenizer)?;
                text.append(&fragment);
            }
            Ok(XmlEvent::CData(e)) => {
                text.append(&String::from_utf8_lossy(&e.into_inner()));
            }
            Ok(XmlEvent::Eof) => {
                // Open elements at end of input mean a truncated document.
                if text.depth() > 0 {
                    return Err(ParseError::tokenizer("unexpected end of document"));
                }
                break;
            }
            // Prolog, comments, PIs, doctype: no bearing on the model.
            Ok(_) => {}
            Err(e) => return Err(ParseError::tokenizer(e)),
        }
        buf.clear();
    }

    machine.finish().map_err(ParseError::new)
}

fn local_name(name: QName<'_>) -> String {
    String::from_utf8_lossy(name.local_name().as_ref()).into_owned()
}

fn collect_attributes(e: &BytesStart<'_>) -> Result<Attributes, ParseError> {
    let mut attrs = Attributes::new();
    for attr in e.attributes() {
        let attr = attr.map_err(|_| ParseError::new(ErrorCode::BadAttribute))?;
        let value = attr.unescape_value().map_err(ParseError::tokenizer)?;
        attrs.push(local_name(attr.key), value.into_owned());
    }
    Ok(attrs)
}
