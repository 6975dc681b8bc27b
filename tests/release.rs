//! Release accounting. A counting global allocator keeps a per-thread tally
//! of live allocations so parallel test threads do not see each other.
use std::alloc::{GlobalAlloc, Layout, System};
use std::cell::Cell;

use uidl::{CompletionFlags, Document, KeywordPair, Node};

struct Counting;

thread_local! {
    static LIVE: Cell<isize> = const { Cell::new(0) };
}

fn bump(delta: isize) {
    let _ = LIVE.try_with(|live| live.set(live.get() + delta));
}

unsafe impl GlobalAlloc for Counting {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        let ptr = unsafe { System.alloc(layout) };
        if !ptr.is_null() {
            bump(1);
        }
        ptr
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        bump(-1);
        unsafe { System.dealloc(ptr, layout) }
    }

    unsafe fn realloc(&self, ptr: *mut u8, layout: Layout, new_size: usize) -> *mut u8 {
        unsafe { System.realloc(ptr, layout, new_size) }
    }
}

#[global_allocator]
static GLOBAL: Counting = Counting;

fn live() -> isize {
    LIVE.with(Cell::get)
}

/// Runs every mutation path once so lazily registered logging callsites do
/// not show up inside a measured window.
fn warm_up() {
    let mut doc = Document::new();
    doc.set_completion(Node::reference("a"));
    doc.set_completion(Node::reference("b"));
    doc.set_completion_metadata(CompletionFlags::FLAT, Some("out"), None);
    doc.set_definition("k", Node::integer(None, None));
    doc.set_definition("k", Node::integer(None, None));
    let mut node = Node::keyword(Vec::new());
    node.set_keyword("k", None::<Node>).unwrap();
    node.set_keyword("k", None::<Node>).unwrap();
    doc.set_completion(node);
    let _ = doc.to_json();
}

fn grammar() -> Node {
    Node::keyword([
        KeywordPair::new(
            "run",
            Node::sequence([
                Some(Node::string(["-v", "--verbose"]).with_id("verbosity")),
                Some(Node::repeat(Node::reference("arg"), ["--", ";"])),
                None,
            ]),
        ),
        KeywordPair::new("wait", Node::float(Some(0.0), None)),
    ])
    .with_id("commands")
}

#[test]
fn dropping_a_document_releases_everything() {
    warm_up();
    let baseline = live();
    {
        let mut doc = Document::new();
        doc.set_completion_metadata(CompletionFlags::FLAT, Some("out"), Some("err"));
        doc.set_completion(grammar());
        doc.set_definition("arg", Node::string(["a", "b", "c"]));
        doc.set_definition("count", Node::integer(Some(1), Some(3)));
        doc.set_definition("arg", grammar());
        doc.set_completion_metadata(CompletionFlags::NONE, Some("out2"), None);
        let text = doc.to_json();
        assert!(!text.is_empty());
        assert!(live() > baseline);
    }
    assert_eq!(live(), baseline);
}

#[test]
fn keyword_upsert_releases_previous_node() {
    warm_up();
    let mut node = Node::keyword(Vec::new());
    node.set_keyword("x", Node::integer(None, None)).unwrap();
    let before = live();

    let replacement = grammar();
    let with_replacement = live();
    node.set_keyword("x", replacement).unwrap();
    // the replaced integer holds no heap storage of its own
    assert_eq!(live(), with_replacement);

    node.set_keyword("x", Node::integer(Some(5), None)).unwrap();
    assert_eq!(live(), before);
    assert_eq!(node.as_keyword().map(|k| k.len()), Some(1));
}

#[test]
fn replacing_completion_releases_previous_root() {
    warm_up();
    let mut doc = Document::new();
    doc.set_completion(Node::reference("a"));
    let with_reference = live();

    doc.set_completion(grammar());
    doc.set_completion(Node::reference("b"));
    assert_eq!(live(), with_reference);

    doc.set_completion(None::<Node>);
    assert_eq!(live(), with_reference - 1);
}
