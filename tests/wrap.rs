mod support;

use std::cell::RefCell;
use std::rc::Rc;

use ferry::http::{Body, Bytes, Headers, StatusCode};
use ferry::wrap::{wrap_fn, Call, Rewrite};
use ferry::{Application, Context, Environ, Gateway, Hello, Responder, Result, Wrap};

use support::{Output, Releases};

fn serve(app: &impl Application) -> (Result<()>, Output) {
    let out = Output::new();
    let result = Gateway::new().serve(app, Environ::new(), out.clone());
    (result, out)
}

fn declaring(
    headers: Headers,
    chunks: &'static [&'static str],
) -> impl Fn(&mut Context, Responder) -> Result<Body> {
    move |_: &mut Context, respond: Responder| -> Result<Body> {
        respond.start(StatusCode::OK, headers.clone())?;
        Ok(Body::stream(chunks.iter().copied()))
    }
}

#[test]
fn rewrite_text() {
    let app = declaring(
        Headers::from([("content-type", "text/plain"), ("Content-Length", "3")]),
        &["abc"],
    )
    .wrap(Rewrite::shift_text());

    let (result, out) = serve(&app);
    result.unwrap();

    let (head, body) = out.split();
    assert_eq!(body, b"bcd");
    assert_eq!(head, "Status: 200 OK\r\ncontent-type: text/plain");
    assert!(!head.to_ascii_lowercase().contains("content-length"));
}

#[test]
fn pass_through_other_types() {
    let app = declaring(
        Headers::from([
            ("Content-Type", "application/octet-stream"),
            ("Content-Length", "3"),
        ]),
        &["abc"],
    )
    .wrap(Rewrite::shift_text());

    let (result, out) = serve(&app);
    result.unwrap();

    let (head, body) = out.split();
    assert_eq!(body, b"abc");
    assert_eq!(
        head,
        "Status: 200 OK\r\nContent-Type: application/octet-stream\r\nContent-Length: 3"
    );
}

#[test]
fn rewrite_keeps_other_headers_in_order() {
    let app = declaring(
        Headers::from([
            ("X-First", "1"),
            ("Content-Length", "6"),
            ("Content-Type", "text/plain"),
            ("content-length", "6"),
            ("X-Last", "2"),
        ]),
        &["ab", "cd"],
    )
    .wrap(Rewrite::shift_text());

    let (result, out) = serve(&app);
    result.unwrap();

    let (head, body) = out.split();
    assert_eq!(
        head,
        "Status: 200 OK\r\nX-First: 1\r\nContent-Type: text/plain\r\nX-Last: 2"
    );
    assert_eq!(body, b"bcde");
}

#[test]
fn hello() {
    let (result, out) = serve(&Hello.wrap(Rewrite::shift_text()));
    result.unwrap();

    assert_eq!(out.head(), "Status: 200 OK\r\nContent-type: text/plain");
    assert_eq!(out.body(), ferry::wrap::shift_up(Hello::BODY));

    let (result, out) = serve(&Hello);
    result.unwrap();
    assert_eq!(out.body(), Hello::BODY);
}

#[test]
fn rewrite_sink_writes() {
    let app = (|_: &mut Context, respond: Responder| -> Result<Body> {
        let sink = respond.start(StatusCode::OK, Headers::from([("Content-Type", "text/plain")]))?;
        sink.write("ab")?;
        Ok(Body::once("cd"))
    })
    .wrap(Rewrite::shift_text());

    let (result, out) = serve(&app);
    result.unwrap();
    assert_eq!(out.body(), b"bcde");
}

fn tag(byte: u8) -> Rewrite {
    Rewrite::new(mime::TEXT_PLAIN, move |chunk: &[u8]| {
        let mut tagged = chunk.to_vec();
        tagged.push(byte);
        Bytes::from(tagged)
    })
}

#[test]
fn composition_order() {
    let app = declaring(Headers::from([("Content-Type", "text/plain")]), &["x", "y"])
        .wrap(tag(b'3'))
        .wrap(tag(b'2'))
        .wrap(tag(b'1'));

    let (result, out) = serve(&app);
    result.unwrap();
    assert_eq!(out.body(), b"x321y321");
}

#[test]
fn and_composes_like_nesting() {
    let app = declaring(Headers::from([("Content-Type", "text/plain")]), &["x"])
        .wrap(tag(b'3').and(tag(b'2')).and(tag(b'1')));

    let (result, out) = serve(&app);
    result.unwrap();
    assert_eq!(out.body(), b"x321");
}

#[test]
fn wrap_order() {
    type Log = Rc<RefCell<Vec<usize>>>;

    fn push(log: &Log, n: usize) -> impl Wrap {
        let log = log.clone();
        wrap_fn(move |cx: &mut Context, respond: Responder, next: &dyn Application| {
            log.borrow_mut().push(n);
            next.call(cx, respond)
        })
    }

    let log = Log::default();
    let inner = log.clone();

    let app = (move |_: &mut Context, respond: Responder| -> Result<Body> {
        inner.borrow_mut().push(6);
        respond.start(StatusCode::NO_CONTENT, Headers::new())?;
        Ok(Body::empty())
    })
    .wrap(push(&log, 5))
    .wrap(push(&log, 3).and(push(&log, 2)))
    .wrap(Call::new())
    .wrap(push(&log, 1).and(push(&log, 0)));

    let (result, out) = serve(&app);
    result.unwrap();

    assert_eq!(*log.borrow(), [0, 1, 2, 3, 5, 6]);
    assert_eq!(out.head(), "Status: 204 No Content");
}

#[test]
fn header_edits_stack() {
    fn rename(from: &'static str, to: &'static str) -> impl Wrap {
        wrap_fn(move |cx: &mut Context, respond: Responder, next: &dyn Application| {
            let renamer = Renamer {
                outer: respond,
                from,
                to,
            };
            next.call(cx, Responder::new(renamer))
        })
    }

    struct Renamer {
        outer: Responder,
        from: &'static str,
        to: &'static str,
    }

    impl ferry::Respond for Renamer {
        fn respond(
            &self,
            status: ferry::http::Status,
            headers: Headers,
            abort: Option<ferry::Abort>,
        ) -> Result<ferry::Declared> {
            let headers = headers
                .into_iter()
                .map(|(name, value)| {
                    if name == self.from {
                        (self.to.to_owned(), value)
                    } else {
                        (name, value)
                    }
                })
                .collect();
            self.outer.respond(status, headers, abort)
        }
    }

    let app = declaring(Headers::from([("X-A", "1")]), &["ok"])
        .wrap(rename("X-A", "X-B"))
        .wrap(rename("X-B", "X-C"));

    let (result, out) = serve(&app);
    result.unwrap();
    assert_eq!(out.head(), "Status: 200 OK\r\nX-C: 1");
}

#[test]
fn rewrite_propagates_release() {
    let releases = Releases::default();
    let hook = releases.clone();

    let app = (move |_: &mut Context, respond: Responder| -> Result<Body> {
        respond.start(StatusCode::OK, Headers::from([("Content-Type", "text/plain")]))?;
        Ok(Body::stream(["a", "b"]).on_release(hook.hook()))
    })
    .wrap(Rewrite::shift_text())
    .wrap(Rewrite::shift_text());

    let (result, out) = serve(&app);
    result.unwrap();
    assert_eq!(out.body(), b"cd");
    assert_eq!(releases.count(), 1);
}

#[test]
fn abort_re_decides_rewrite() {
    let app = (|_: &mut Context, respond: Responder| -> Result<Body> {
        respond.start(StatusCode::OK, Headers::from([("Content-Type", "text/plain")]))?;
        respond.abort(
            StatusCode::INTERNAL_SERVER_ERROR,
            Headers::from([("Content-Type", "text/html")]),
            ferry::Abort::new("template missing"),
        )?;
        Ok(Body::once("<p>oops</p>"))
    })
    .wrap(Rewrite::shift_text());

    let (result, out) = serve(&app);
    result.unwrap();

    let (head, body) = out.split();
    assert_eq!(head, "Status: 500 Internal Server Error\r\nContent-Type: text/html");
    assert_eq!(body, b"<p>oops</p>");
}

#[test]
fn late_abort_keeps_decision() {
    let app = (|_: &mut Context, respond: Responder| -> Result<Body> {
        let sink = respond.start(StatusCode::OK, Headers::from([("Content-Type", "text/html")]))?;
        sink.write("ab")?;

        // too late to switch to text/plain
        let declared = respond.respond(
            StatusCode::INTERNAL_SERVER_ERROR.into(),
            Headers::from([("Content-Type", "text/plain")]),
            Some(ferry::Abort::new("render failed")),
        )?;
        assert!(declared.is_aborted());

        Ok(Body::once("cd"))
    })
    .wrap(Rewrite::shift_text());

    let (result, out) = serve(&app);
    result.unwrap();

    let (head, body) = out.split();
    assert_eq!(head, "Status: 200 OK\r\nContent-Type: text/html");
    assert_eq!(body, b"abcd");
}
