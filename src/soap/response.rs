use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::poller::PollerError;
use crate::position::PositionEntry;

/// Element tree with namespace prefixes stripped.
#[derive(Debug, Default)]
struct Node {
    name: String,
    text: String,
    nil: bool,
    children: Vec<Node>,
}

impl Node {
    fn from_start(start: &BytesStart<'_>) -> Self {
        let nil = start.attributes().flatten().any(|attr| {
            attr.key.local_name().as_ref() == b"nil"
                && matches!(attr.value.as_ref(), b"true" | b"1")
        });

        Node {
            name: String::from_utf8_lossy(start.local_name().as_ref()).into_owned(),
            nil,
            ..Node::default()
        }
    }

    fn child(&self, name: &str) -> Option<&Node> {
        self.children.iter().find(|c| c.name == name)
    }

    fn child_text(&self, name: &str) -> String {
        self.child(name)
            .map(|c| c.text.trim().to_string())
            .unwrap_or_default()
    }
}

fn parse_tree(xml: &str) -> Result<Node, PollerError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut stack = vec![Node::default()];
    let unbalanced = || PollerError::MalformedResponse("unbalanced elements".into());

    loop {
        match reader.read_event()? {
            Event::Start(start) => stack.push(Node::from_start(&start)),
            Event::Empty(start) => {
                let node = Node::from_start(&start);
                stack.last_mut().ok_or_else(unbalanced)?.children.push(node);
            }
            Event::End(_) => {
                let node = stack.pop().ok_or_else(unbalanced)?;
                stack.last_mut().ok_or_else(unbalanced)?.children.push(node);
            }
            Event::Text(text) => {
                let text = text.unescape()?;
                stack.last_mut().ok_or_else(unbalanced)?.text.push_str(&text);
            }
            Event::CData(data) => {
                let data = data.into_inner();
                stack
                    .last_mut()
                    .ok_or_else(unbalanced)?
                    .text
                    .push_str(&String::from_utf8_lossy(&data));
            }
            Event::Eof => break,
            _ => {}
        }
    }

    match (stack.pop(), stack.is_empty()) {
        (Some(document), true) => Ok(document),
        _ => Err(unbalanced()),
    }
}

/// Parse a `GetPositionsByIp` response envelope into its position entries.
///
/// The first child of the body is the response wrapper and its first child the
/// returned collection. A missing or nil collection yields no entries. A fault body
/// is reported as [`PollerError::Fault`].
pub fn parse_positions(xml: &str) -> Result<Vec<PositionEntry>, PollerError> {
    let document = parse_tree(xml)?;

    let envelope = document
        .child("Envelope")
        .ok_or_else(|| PollerError::MalformedResponse("missing soap envelope".into()))?;
    let body = envelope
        .child("Body")
        .ok_or_else(|| PollerError::MalformedResponse("missing soap body".into()))?;

    if let Some(fault) = body.child("Fault") {
        let reason = fault.child_text("faultstring");
        let code = fault.child_text("faultcode");
        let message = match (code.is_empty(), reason.is_empty()) {
            (true, true) => "unspecified fault".to_string(),
            (true, false) => reason,
            (false, true) => code,
            (false, false) => format!("{code}: {reason}"),
        };
        return Err(PollerError::Fault(message));
    }

    let response = body
        .children
        .first()
        .ok_or_else(|| PollerError::MalformedResponse("empty soap body".into()))?;

    let Some(collection) = response.children.first() else {
        return Ok(Vec::new());
    };
    if collection.nil {
        return Ok(Vec::new());
    }

    Ok(collection
        .children
        .iter()
        .map(|item| PositionEntry {
            id: item.child_text("id"),
            shortname: item.child_text("shortname"),
            satlatitude: item.child_text("satlatitude"),
            satlongitude: item.child_text("satlongitude"),
            sataltitude: item.child_text("sataltitude"),
        })
        .collect())
}
