// BullseyeCoverage XML loader
//
// Produced by `covxml` from a Bullseye .cov file. Layout:
// <BullseyeCoverage xmlns="http://www.bullseye.com/covxml" name="..." dir="...">
//   <folder name="src">
//     <src name="main.c" mtime="...">
//       <fn name="main" fn_cov="1" fn_total="1" cd_cov="2" cd_total="4">
//         <probe line="12" kind="decision" event="full"/>
//       </fn>
//     </src>
//   </folder>
// </BullseyeCoverage>

use super::filter::{join_segment, MAX_DEPTH};
use super::{
    Container, CoverageDocument, CoverageError, CoverageNode, CoverageParser, FunctionEntry,
};
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::NsReader;
use std::fs::{self, File};
use std::io::Read;
use std::path::Path;

/// Namespace every element of a Bullseye report is bound to
pub const BULLSEYE_NAMESPACE: &str = "http://www.bullseye.com/covxml";

const ROOT_ELEMENT: &[u8] = b"BullseyeCoverage";

/// How much of a file `can_parse` looks at
const SNIFF_LEN: u64 = 4096;

/// Loader for BullseyeCoverage XML reports
#[derive(Debug, Clone, Default)]
pub struct BullseyeParser;

impl BullseyeParser {
    pub fn new() -> Self {
        Self
    }
}

impl CoverageParser for BullseyeParser {
    fn parse(&self, path: &Path) -> Result<CoverageDocument, CoverageError> {
        let content = fs::read_to_string(path).map_err(|source| CoverageError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        parse_document(&content)
    }

    fn can_parse(&self, path: &Path) -> bool {
        let Ok(file) = File::open(path) else {
            return false;
        };

        let mut head = Vec::new();
        if file.take(SNIFF_LEN).read_to_end(&mut head).is_err() {
            return false;
        }

        let head = String::from_utf8_lossy(&head);
        head.contains(BULLSEYE_NAMESPACE)
    }
}

/// Element being built while its end tag has not been seen yet
enum Frame {
    Root(Vec<CoverageNode>),
    Folder(Container),
    Source(Container),
    Function(FunctionEntry),
    /// Foreign or unknown element, dropped with everything below it
    Ignored,
}

impl Frame {
    fn is_container(&self) -> bool {
        matches!(self, Frame::Folder(_) | Frame::Source(_))
    }

    fn accepts_children(&self) -> bool {
        matches!(self, Frame::Root(_) | Frame::Folder(_) | Frame::Source(_))
    }

    fn push_child(&mut self, node: CoverageNode) {
        match self {
            Frame::Root(children) => children.push(node),
            Frame::Folder(container) | Frame::Source(container) => container.children.push(node),
            Frame::Function(_) | Frame::Ignored => {}
        }
    }
}

/// Attributes the filter cares about
#[derive(Default)]
struct ElementAttributes {
    name: Option<String>,
    fn_cov: Option<String>,
    cd_cov: Option<String>,
}

/// Parse a whole report into a tree
///
/// Folder/source nesting is capped at `MAX_DEPTH` here, before the tree is
/// built, since building, walking and dropping it all recurse per level.
pub(super) fn parse_document(content: &str) -> Result<CoverageDocument, CoverageError> {
    let mut reader = NsReader::from_str(content);
    let mut buf = Vec::new();
    let mut stack: Vec<Frame> = Vec::new();
    let mut document: Option<CoverageDocument> = None;
    let mut container_depth = 0usize;

    loop {
        let position = reader.buffer_position();
        match reader.read_resolved_event_into(&mut buf) {
            Ok((ns, Event::Start(e))) => {
                let frame = open_element(&stack, &document, &ns, &e, position)?;
                if frame.is_container() {
                    check_depth(&stack, &frame, container_depth)?;
                    container_depth += 1;
                }
                stack.push(frame);
            }
            Ok((ns, Event::Empty(e))) => {
                let frame = open_element(&stack, &document, &ns, &e, position)?;
                if frame.is_container() {
                    check_depth(&stack, &frame, container_depth)?;
                }
                close_frame(&mut stack, frame, &mut document);
            }
            Ok((_, Event::End(_))) => {
                let frame = stack
                    .pop()
                    .ok_or(CoverageError::Truncated("a matching start tag was found"))?;
                if frame.is_container() {
                    container_depth -= 1;
                }
                close_frame(&mut stack, frame, &mut document);
            }
            Ok((_, Event::Text(e))) if stack.is_empty() => {
                let text = String::from_utf8_lossy(&e);
                if !is_blank(&text) {
                    return Err(CoverageError::StrayText(text.trim().to_string()));
                }
            }
            Ok((_, Event::CData(e))) if stack.is_empty() => {
                return Err(CoverageError::StrayText(
                    String::from_utf8_lossy(&e).to_string(),
                ));
            }
            Ok((_, Event::Eof)) => break,
            Err(source) => return Err(CoverageError::Xml { position, source }),
            _ => {}
        }
        buf.clear();
    }

    if !stack.is_empty() {
        return Err(CoverageError::Truncated("the root element was closed"));
    }

    document.ok_or(CoverageError::Truncated("a root element was found"))
}

fn check_depth(stack: &[Frame], frame: &Frame, depth: usize) -> Result<(), CoverageError> {
    if depth < MAX_DEPTH {
        return Ok(());
    }

    let path = stack
        .iter()
        .chain(std::iter::once(frame))
        .filter_map(|frame| match frame {
            Frame::Folder(container) | Frame::Source(container) => Some(container.name.as_str()),
            _ => None,
        })
        .fold(String::new(), join_segment);

    Err(CoverageError::Traversal {
        path,
        reason: format!("nesting deeper than {} levels", MAX_DEPTH),
    })
}

/// Whitespace (and a byte-order mark) is all that may sit outside the root
fn is_blank(text: &str) -> bool {
    text.chars().all(|c| c.is_whitespace() || c == '\u{feff}')
}

fn open_element(
    stack: &[Frame],
    document: &Option<CoverageDocument>,
    ns: &ResolveResult,
    e: &BytesStart,
    position: usize,
) -> Result<Frame, CoverageError> {
    if let ResolveResult::Unknown(prefix) = ns {
        return Err(CoverageError::UnboundPrefix(
            String::from_utf8_lossy(prefix).to_string(),
        ));
    }

    let Some(parent) = stack.last() else {
        if document.is_some() {
            return Err(CoverageError::TrailingElement(qualified_name(ns, e)));
        }
        if is_bullseye(ns) && e.local_name().as_ref() == ROOT_ELEMENT {
            return Ok(Frame::Root(Vec::new()));
        }
        return Err(CoverageError::UnexpectedRoot {
            found: qualified_name(ns, e),
        });
    };

    if !parent.accepts_children() || !is_bullseye(ns) {
        return Ok(Frame::Ignored);
    }

    let frame = match e.local_name().as_ref() {
        b"folder" => {
            let attrs = read_attributes(e, position)?;
            Frame::Folder(Container::new(attrs.name.unwrap_or_default(), Vec::new()))
        }
        b"src" => {
            let attrs = read_attributes(e, position)?;
            Frame::Source(Container::new(attrs.name.unwrap_or_default(), Vec::new()))
        }
        b"fn" => {
            let attrs = read_attributes(e, position)?;
            Frame::Function(FunctionEntry {
                name: attrs.name.unwrap_or_default(),
                fn_cov: attrs.fn_cov,
                cd_cov: attrs.cd_cov,
            })
        }
        _ => Frame::Ignored,
    };

    Ok(frame)
}

fn close_frame(stack: &mut [Frame], frame: Frame, document: &mut Option<CoverageDocument>) {
    let node = match frame {
        Frame::Root(children) => {
            *document = Some(CoverageDocument::new(children));
            return;
        }
        Frame::Folder(container) => CoverageNode::Folder(container),
        Frame::Source(container) => CoverageNode::Source(container),
        Frame::Function(entry) => CoverageNode::Function(entry),
        Frame::Ignored => return,
    };

    if let Some(parent) = stack.last_mut() {
        parent.push_child(node);
    }
}

fn read_attributes(e: &BytesStart, position: usize) -> Result<ElementAttributes, CoverageError> {
    let mut attrs = ElementAttributes::default();

    for attr in e.attributes() {
        let attr = attr.map_err(|err| CoverageError::Xml {
            position,
            source: err.into(),
        })?;

        let slot = match attr.key.as_ref() {
            b"name" => &mut attrs.name,
            b"fn_cov" => &mut attrs.fn_cov,
            b"cd_cov" => &mut attrs.cd_cov,
            _ => continue,
        };

        let value = attr
            .unescape_value()
            .map_err(|source| CoverageError::Xml { position, source })?;
        *slot = Some(value.into_owned());
    }

    Ok(attrs)
}

fn is_bullseye(ns: &ResolveResult) -> bool {
    matches!(ns, ResolveResult::Bound(Namespace(uri)) if *uri == BULLSEYE_NAMESPACE.as_bytes())
}

/// `{namespace}local`, or just `local` when unbound
fn qualified_name(ns: &ResolveResult, e: &BytesStart) -> String {
    let local = String::from_utf8_lossy(e.local_name().as_ref()).to_string();
    match ns {
        ResolveResult::Bound(Namespace(uri)) => {
            format!("{{{}}}{}", String::from_utf8_lossy(uri), local)
        }
        _ => local,
    }
}
