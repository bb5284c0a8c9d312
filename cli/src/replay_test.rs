use frames::{ChatMessage, Point, RoomId, Tool, encode_frame};

use super::*;

const WHITE: [u8; 4] = [255, 255, 255, 255];
const RED: [u8; 4] = [255, 0, 0, 255];

fn room() -> RoomId {
    RoomId::parse("ABC123").expect("room")
}

fn red_line() -> DrawOp {
    DrawOp::segment(Tool::Pen, Point::new(5.0, 20.0), Point::new(35.0, 20.0), "#ff0000", 4.0)
}

fn jsonl(lines: &[String]) -> String {
    lines.join("\n")
}

#[test]
fn bare_ops_and_frames_both_draw() {
    let input = jsonl(&[
        serde_json::to_string(&red_line()).expect("op"),
        encode_frame(&Frame::draw(room(), red_line())).expect("frame"),
    ]);
    let mut pixmap = Pixmap::new(40, 40);

    let stats = replay(input.as_bytes(), &mut pixmap).expect("replay");

    assert_eq!(stats, ReplayStats { drawn: 2, cleared: 0, skipped: 0 });
    assert_eq!(pixmap.pixel(20, 20), Some(RED));
}

#[test]
fn clear_frame_wipes_earlier_ops() {
    let input = jsonl(&[
        serde_json::to_string(&red_line()).expect("op"),
        encode_frame(&Frame::clear(room())).expect("frame"),
    ]);
    let mut pixmap = Pixmap::new(40, 40);

    let stats = replay(input.as_bytes(), &mut pixmap).expect("replay");

    assert_eq!(stats.cleared, 1);
    assert_eq!(pixmap.count(WHITE), 1600);
}

#[test]
fn blank_and_unrelated_lines_are_skipped() {
    let input = jsonl(&[
        String::new(),
        "[1, 2, 3]".to_owned(),
        encode_frame(&Frame::chat(room(), ChatMessage::new("u1", "alice", "hi"))).expect("frame"),
        encode_frame(&Frame::user_joined("bob")).expect("frame"),
    ]);
    let mut pixmap = Pixmap::new(10, 10);

    let stats = replay(input.as_bytes(), &mut pixmap).expect("replay");

    assert_eq!(stats, ReplayStats { drawn: 0, cleared: 0, skipped: 4 });
}

#[test]
fn malformed_line_reports_line_number() {
    let input = jsonl(&[serde_json::to_string(&red_line()).expect("op"), "{oops".to_owned()]);
    let mut pixmap = Pixmap::new(10, 10);

    let err = replay(input.as_bytes(), &mut pixmap).expect_err("bad json");
    assert!(matches!(err, CliError::BadLine { line: 2, .. }));
}

#[test]
fn run_writes_png() {
    let dir = std::env::temp_dir().join(format!("deepboard-replay-{}", uuid::Uuid::new_v4()));
    std::fs::create_dir_all(&dir).expect("mkdir");
    let input = dir.join("ops.jsonl");
    let out = dir.join("board.png");
    std::fs::write(&input, serde_json::to_string(&red_line()).expect("op")).expect("write");

    let args = ReplayArgs { input: input.display().to_string(), out: out.clone(), width: 40, height: 40 };
    run(&args).expect("replay");

    let decoded = image::open(&out).expect("png").to_rgba8();
    assert_eq!(decoded.dimensions(), (40, 40));
    assert_eq!(decoded.get_pixel(20, 20).0, RED);

    std::fs::remove_dir_all(dir).expect("cleanup");
}
