#![allow(dead_code)]

use std::{
    cell::RefCell,
    io::{BufRead, BufReader, Cursor, Read, Write},
    net::{TcpListener, TcpStream},
    rc::Rc,
    sync::mpsc::{self, Receiver},
    thread,
    time::{Duration, Instant},
};

use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use leafscan::app::controller::PageController;
use leafscan::image_utils::ImageFile;
use leafscan::preview::PreviewSource;
use once_cell::sync::Lazy;

/// A small encoded leaf photo shared by every test that needs real image bytes.
pub static LEAF_PNG: Lazy<Vec<u8>> = Lazy::new(|| png_bytes(&solid_image(4, 3, [10, 120, 30, 255])));

pub fn solid_image(width: u32, height: u32, color: [u8; 4]) -> DynamicImage {
    let pixel = Rgba(color);
    let buffer = RgbaImage::from_pixel(width, height, pixel);
    DynamicImage::ImageRgba8(buffer)
}

pub fn encode(image: &DynamicImage, format: ImageFormat) -> Vec<u8> {
    let mut out = Cursor::new(Vec::new());
    image
        .write_to(&mut out, format)
        .expect("failed to encode image");
    out.into_inner()
}

pub fn png_bytes(image: &DynamicImage) -> Vec<u8> {
    encode(image, ImageFormat::Png)
}

pub fn png_file(name: &str) -> ImageFile {
    ImageFile::new(name, "image/png", LEAF_PNG.clone())
}

#[derive(Default)]
pub struct PreviewLog {
    pub live: Vec<u64>,
    pub events: Vec<String>,
    pub created: usize,
    pub released: usize,
}

/// Preview source that hands out numbered handles and records every call.
#[derive(Default)]
pub struct CountingPreviews {
    pub log: Rc<RefCell<PreviewLog>>,
    next: u64,
}

impl CountingPreviews {
    pub fn new() -> (Self, Rc<RefCell<PreviewLog>>) {
        let previews = Self::default();
        let log = previews.log.clone();
        (previews, log)
    }
}

impl PreviewSource for CountingPreviews {
    type Handle = u64;

    fn create(&mut self, file: &ImageFile) -> u64 {
        let id = self.next;
        self.next += 1;
        let mut log = self.log.borrow_mut();
        log.live.push(id);
        log.created += 1;
        log.events.push(format!("create {id} {}", file.name));
        id
    }

    fn release(&mut self, handle: u64) {
        let mut log = self.log.borrow_mut();
        log.live.retain(|id| *id != handle);
        log.released += 1;
        log.events.push(format!("release {handle}"));
    }
}

pub struct RecordedRequest {
    pub head: String,
    pub body: Vec<u8>,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<String> {
        self.head.lines().find_map(|line| {
            let (key, value) = line.split_once(':')?;
            key.trim()
                .eq_ignore_ascii_case(name)
                .then(|| value.trim().to_string())
        })
    }

    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Minimal HTTP endpoint that answers a single request with a canned response.
pub struct MockEndpoint {
    pub url: String,
    requests: Receiver<RecordedRequest>,
}

impl MockEndpoint {
    pub fn respond(status: u16, body: &str) -> Self {
        Self::respond_after(status, body, Duration::ZERO)
    }

    pub fn respond_after(status: u16, body: &str, delay: Duration) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind mock endpoint");
        let addr = listener.local_addr().expect("local addr");
        let (tx, rx) = mpsc::channel();
        let body = body.to_string();

        thread::spawn(move || {
            let Ok((stream, _)) = listener.accept() else {
                return;
            };
            let Ok(request) = read_request(&stream) else {
                return;
            };
            let _ = tx.send(request);
            thread::sleep(delay);
            let _ = write_response(stream, status, &body);
        });

        Self {
            url: format!("http://{addr}/api/upload"),
            requests: rx,
        }
    }

    pub fn received(&self) -> RecordedRequest {
        self.requests
            .recv_timeout(Duration::from_secs(5))
            .expect("mock endpoint received no request")
    }
}

/// An endpoint on a port nothing listens on.
pub fn unreachable_endpoint() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);
    format!("http://{addr}/api/upload")
}

fn read_request(stream: &TcpStream) -> std::io::Result<RecordedRequest> {
    let mut reader = BufReader::new(stream);
    let mut head = String::new();
    loop {
        let mut line = String::new();
        if reader.read_line(&mut line)? == 0 || line == "\r\n" {
            break;
        }
        head.push_str(&line);
    }

    let mut request = RecordedRequest {
        head,
        body: Vec::new(),
    };
    if let Some(length) = request.header("content-length") {
        let length: usize = length.parse().unwrap_or(0);
        let mut body = vec![0; length];
        reader.read_exact(&mut body)?;
        request.body = body;
    } else if request
        .header("transfer-encoding")
        .map_or(false, |v| v.eq_ignore_ascii_case("chunked"))
    {
        request.body = read_chunked(&mut reader)?;
    }
    Ok(request)
}

fn read_chunked(reader: &mut impl BufRead) -> std::io::Result<Vec<u8>> {
    let mut body = Vec::new();
    loop {
        let mut size_line = String::new();
        reader.read_line(&mut size_line)?;
        let size = usize::from_str_radix(size_line.trim(), 16).unwrap_or(0);
        if size == 0 {
            let mut trailer = String::new();
            reader.read_line(&mut trailer)?;
            return Ok(body);
        }
        let mut chunk = vec![0; size + 2];
        reader.read_exact(&mut chunk)?;
        chunk.truncate(size);
        body.extend_from_slice(&chunk);
    }
}

fn write_response(mut stream: TcpStream, status: u16, body: &str) -> std::io::Result<()> {
    let reason = match status {
        200 => "OK",
        404 => "Not Found",
        500 => "Internal Server Error",
        _ => "Status",
    };
    write!(
        stream,
        "HTTP/1.1 {status} {reason}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    )?;
    stream.flush()
}

pub fn wait_until_done(controller: &mut PageController) {
    let start = Instant::now();
    while controller.is_uploading() {
        if start.elapsed() > Duration::from_secs(10) {
            panic!("timed out waiting for upload");
        }
        thread::sleep(Duration::from_millis(20));
        controller.poll();
    }
}
