use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures::future::BoxFuture;
use futures::FutureExt;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

use crate::carousel::{CarouselInput, ClickTarget, InputEffect, NavKey};
use crate::catalog::HairstyleEntry;
use crate::filter::{Facet, FacetFilter};
use crate::gallery::{Gallery, GalleryError, GalleryView};
use crate::probe::{self, DisplaySet, HttpLoader, ImageLoader, ImageResolver, ProbeError, ProbeOutcome};

#[derive(Clone, Copy, Debug)]
enum Script {
    Ok,
    Fail,
    Delay(Duration),
}

/// Loader with per-source behavior that records call order and concurrency.
#[derive(Default)]
struct ScriptedLoader {
    scripts: HashMap<String, Script>,
    calls: Mutex<Vec<String>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl ScriptedLoader {
    fn new(scripts: &[(&str, Script)]) -> Self {
        Self {
            scripts: scripts
                .iter()
                .map(|(k, v)| (k.to_string(), *v))
                .collect(),
            ..Default::default()
        }
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl ImageLoader for ScriptedLoader {
    fn load<'a>(&'a self, src: &'a str) -> BoxFuture<'a, Result<(), ProbeError>> {
        async move {
            self.calls.lock().unwrap().push(src.to_string());
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);
            let _guard = InFlight(&self.in_flight);
            match self.scripts.get(src).copied().unwrap_or(Script::Ok) {
                Script::Ok => Ok(()),
                Script::Fail => Err(ProbeError::NotAFile {
                    path: src.to_string(),
                }),
                Script::Delay(d) => {
                    tokio::time::sleep(d).await;
                    Ok(())
                }
            }
        }
        .boxed()
    }
}

/// Succeeds after a delay and remembers whether it ever got that far.
struct LateLoader {
    delay: Duration,
    settled: AtomicBool,
}

impl ImageLoader for LateLoader {
    fn load<'a>(&'a self, _src: &'a str) -> BoxFuture<'a, Result<(), ProbeError>> {
        async move {
            tokio::time::sleep(self.delay).await;
            self.settled.store(true, Ordering::SeqCst);
            Ok(())
        }
        .boxed()
    }
}

fn entry(name: &str, length: &str, style: &str, faces: &[&str], images: &[&str]) -> HairstyleEntry {
    HairstyleEntry {
        name: name.to_string(),
        length: length.to_string(),
        style: style.to_string(),
        face_shapes: faces.iter().map(|s| s.to_string()).collect(),
        images: images.iter().map(|s| s.to_string()).collect(),
        description: format!("{name} description"),
    }
}

fn strings(v: &[&str]) -> Vec<String> {
    v.iter().map(|s| s.to_string()).collect()
}

fn resolver(loader: Arc<dyn ImageLoader>) -> ImageResolver {
    ImageResolver::new(loader).timeout(Duration::from_millis(200))
}

#[test]
fn candidates_drop_blanks_and_trim() {
    let raw = strings(&["", "  a.jpg ", "   ", "b.jpg"]);
    assert_eq!(probe::candidates(&raw), vec!["a.jpg", "b.jpg"]);
}

#[test]
fn display_set_falls_back_when_nothing_accepted() {
    let set = DisplaySet::from_accepted(Vec::new(), "./images/haircut.jpg");
    assert_eq!(set.images(), &["./images/haircut.jpg".to_string()]);
    assert!(set.is_fallback());
}

#[tokio::test]
async fn probe_reports_load_and_error() {
    let loader = ScriptedLoader::new(&[("bad.jpg", Script::Fail)]);
    let ok = probe::probe(&loader, "good.jpg", Duration::from_secs(1)).await;
    assert!(ok.is_loaded());
    let bad = probe::probe(&loader, "bad.jpg", Duration::from_secs(1)).await;
    assert!(matches!(bad, ProbeOutcome::Failed(ProbeError::NotAFile { .. })));
}

#[tokio::test]
async fn probe_times_out_and_never_settles_late() {
    let loader = LateLoader {
        delay: Duration::from_millis(150),
        settled: AtomicBool::new(false),
    };
    let outcome = probe::probe(&loader, "slow.jpg", Duration::from_millis(20)).await;
    assert!(matches!(outcome, ProbeOutcome::TimedOut));
    tokio::time::sleep(Duration::from_millis(300)).await;
    assert!(!loader.settled.load(Ordering::SeqCst));
}

#[tokio::test]
async fn resolver_probes_sequentially_in_source_order() {
    let loader = Arc::new(ScriptedLoader::new(&[
        ("a.jpg", Script::Delay(Duration::from_millis(30))),
        ("b.jpg", Script::Fail),
        ("c.jpg", Script::Delay(Duration::from_millis(5))),
    ]));
    let set = resolver(loader.clone())
        .resolve(&strings(&["a.jpg", " ", "b.jpg", "c.jpg"]))
        .await;
    assert_eq!(set.images(), &strings(&["a.jpg", "c.jpg"]));
    assert!(!set.is_fallback());
    assert_eq!(loader.calls(), strings(&["a.jpg", "b.jpg", "c.jpg"]));
    assert_eq!(loader.max_in_flight.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn resolver_drops_timeouts_and_falls_back() {
    let loader = Arc::new(ScriptedLoader::new(&[
        ("slow.jpg", Script::Delay(Duration::from_secs(10))),
        ("bad.jpg", Script::Fail),
    ]));
    let set = ImageResolver::new(loader)
        .timeout(Duration::from_millis(30))
        .default_image("fallback.png")
        .resolve(&strings(&["slow.jpg", "bad.jpg"]))
        .await;
    assert_eq!(set.images(), &strings(&["fallback.png"]));
    assert!(set.is_fallback());
}

#[tokio::test]
async fn blank_image_lists_skip_probing() {
    let loader = Arc::new(ScriptedLoader::default());
    let set = resolver(loader.clone()).resolve(&strings(&["", "   "])).await;
    assert_eq!(set.images(), &strings(&[probe::DEFAULT_IMAGE]));
    assert!(loader.calls().is_empty());
}

fn bob() -> HairstyleEntry {
    entry("Bob", "short", "casual", &["oval"], &["a.jpg", "b.jpg"])
}

#[tokio::test]
async fn unfiltered_bob_renders_one_two_image_carousel() {
    let mut gallery = Gallery::new(vec![bob()], resolver(Arc::new(ScriptedLoader::default())));
    gallery.render(FacetFilter::default()).await;

    let GalleryView::Cards(cards) = gallery.view() else {
        panic!("expected cards");
    };
    assert_eq!(cards.len(), 1);
    let card = &cards[0];
    assert!(card.has_nav);
    assert_eq!(card.images.len(), 2);
    assert!(card.images[0].active);
    assert!(!card.images[1].active);
    assert_eq!(card.dots, vec![true, false]);
}

#[tokio::test]
async fn non_matching_face_shape_shows_no_results() {
    let mut gallery = Gallery::new(vec![bob()], resolver(Arc::new(ScriptedLoader::default())));
    gallery.render(FacetFilter::default()).await;
    gallery.set_facet(Facet::FaceShape, Some("round")).await;
    assert_eq!(gallery.view(), GalleryView::NoResults);
    assert!(gallery.cards().is_empty());
}

#[tokio::test]
async fn single_image_cards_are_static() {
    let entries = vec![
        entry("Pixie", "short", "edgy", &["heart"], &["only.jpg"]),
        entry("Bald", "short", "edgy", &["oval"], &[]),
    ];
    let mut gallery = Gallery::new(entries, resolver(Arc::new(ScriptedLoader::default())));
    gallery.render(FacetFilter::default()).await;

    for card in gallery.cards() {
        assert!(card.carousel.is_none());
        let view = card.view();
        assert!(!view.has_nav);
        assert!(view.dots.is_empty());
        assert_eq!(view.images.iter().filter(|i| i.active).count(), 1);
    }
    assert!(gallery.cards()[1].display.is_fallback());

    let id = gallery.card_id(0).unwrap();
    assert_eq!(
        gallery
            .dispatch(id, CarouselInput::Click(ClickTarget::Image))
            .unwrap(),
        InputEffect::Ignored
    );
}

#[tokio::test]
async fn exactly_one_active_image_and_dot_after_every_input() {
    let entries = vec![entry(
        "Waves",
        "long",
        "elegant",
        &["oval"],
        &["1.jpg", "2.jpg", "3.jpg", "4.jpg"],
    )];
    let mut gallery = Gallery::new(entries, resolver(Arc::new(ScriptedLoader::default())));
    gallery.render(FacetFilter::default()).await;
    let id = gallery.card_id(0).unwrap();

    let inputs = [
        CarouselInput::Click(ClickTarget::NextControl),
        CarouselInput::Click(ClickTarget::Image),
        CarouselInput::Click(ClickTarget::Dot(0)),
        CarouselInput::Click(ClickTarget::PrevControl),
        CarouselInput::TouchStart { x: 300.0 },
        CarouselInput::TouchMove { x: 200.0, y: 5.0 },
        CarouselInput::TouchEnd { x: 200.0 },
        CarouselInput::Key(NavKey::ArrowLeft),
    ];
    for input in inputs {
        gallery.dispatch(id, input).unwrap();
        let view = gallery.card(id).unwrap().view();
        assert_eq!(view.images.iter().filter(|i| i.active).count(), 1);
        assert_eq!(view.dots.iter().filter(|d| **d).count(), 1);
        let image_pos = view.images.iter().position(|i| i.active);
        let dot_pos = view.dots.iter().position(|d| *d);
        assert_eq!(image_pos, dot_pos);
    }
}

#[tokio::test]
async fn rerender_discards_state_and_invalidates_handles() {
    let entries = vec![bob(), entry("Lob", "medium", "casual", &["round"], &["c.jpg", "d.jpg"])];
    let mut gallery = Gallery::new(entries, resolver(Arc::new(ScriptedLoader::default())));
    gallery.render(FacetFilter::default()).await;

    let old = gallery.card_id(0).unwrap();
    gallery
        .dispatch(old, CarouselInput::Click(ClickTarget::NextControl))
        .unwrap();
    assert_eq!(gallery.card(old).unwrap().current_index(), 1);

    gallery.set_facet(Facet::Style, Some("casual")).await;
    assert_eq!(
        gallery.dispatch(old, CarouselInput::Click(ClickTarget::NextControl)),
        Err(GalleryError::StaleCard {
            slot: 0,
            generation: 1,
            current: 2
        })
    );
    let fresh = gallery.card_id(0).unwrap();
    assert_eq!(gallery.card(fresh).unwrap().current_index(), 0);
    assert_eq!(
        gallery.card_id(5),
        Err(GalleryError::UnknownCard { slot: 5 })
    );
}

#[tokio::test]
async fn keys_only_reach_the_focused_card() {
    let entries = vec![bob(), entry("Lob", "medium", "casual", &["round"], &["c.jpg", "d.jpg"])];
    let mut gallery = Gallery::new(entries, resolver(Arc::new(ScriptedLoader::default())));
    gallery.render(FacetFilter::default()).await;

    assert_eq!(gallery.key(NavKey::ArrowRight), InputEffect::Ignored);

    let second = gallery.card_id(1).unwrap();
    gallery.focus(second).unwrap();
    assert_eq!(
        gallery.key(NavKey::ArrowRight),
        InputEffect::Moved { from: 0, to: 1 }
    );
    assert_eq!(gallery.cards()[0].current_index(), 0);
    assert_eq!(gallery.cards()[1].current_index(), 1);

    gallery.render(gallery.filter().clone()).await;
    assert_eq!(gallery.focused(), None);
}

#[tokio::test]
async fn session_commands_drive_the_gallery() {
    use crate::session::{execute, parse_command};

    let mut gallery = Gallery::new(vec![bob()], resolver(Arc::new(ScriptedLoader::default())));
    gallery.render(FacetFilter::default()).await;

    let out = execute(&mut gallery, parse_command("swipe 0 200 100").unwrap().unwrap())
        .await
        .unwrap();
    assert_eq!(out, "card 0: image 1 -> 2");
    let out = execute(&mut gallery, parse_command("swipe 0 100 130").unwrap().unwrap())
        .await
        .unwrap();
    assert_eq!(out, "card 0: ignored");
    let out = execute(&mut gallery, parse_command("filter face round").unwrap().unwrap())
        .await
        .unwrap();
    assert!(out.contains("no hairstyles match"));
    assert!(execute(&mut gallery, parse_command("next 0").unwrap().unwrap())
        .await
        .is_err());
}

const DATA: &str = r#"[{"name": "Bob", "length": "short", "style": "casual", "faceShapes": ["oval"], "images": ["img/b.jpg"], "description": "x"}]"#;

async fn spawn_image_server() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        while let Ok((mut sock, _)) = listener.accept().await {
            tokio::spawn(async move {
                let mut buf = vec![0u8; 4096];
                let n = sock.read(&mut buf).await.unwrap_or(0);
                let req = String::from_utf8_lossy(&buf[..n]).to_string();
                let path = req.split_whitespace().nth(1).unwrap_or("/").to_string();
                let (status, ctype, body): (&str, &str, &[u8]) = match path.as_str() {
                    "/ok.jpg" | "/img/b.jpg" => ("200 OK", "image/jpeg", &b"\xff\xd8\xff"[..]),
                    "/page.html" => ("200 OK", "text/html", &b"<html></html>"[..]),
                    "/hairstyles.json" => ("200 OK", "application/json", DATA.as_bytes()),
                    "/slow-hairstyles.json" => {
                        tokio::time::sleep(Duration::from_millis(400)).await;
                        ("200 OK", "application/json", DATA.as_bytes())
                    }
                    "/slow.jpg" => {
                        tokio::time::sleep(Duration::from_secs(5)).await;
                        ("200 OK", "image/jpeg", &b"\xff"[..])
                    }
                    _ => ("404 Not Found", "text/plain", &b"missing"[..]),
                };
                let head = format!(
                    "HTTP/1.1 {status}\r\nContent-Type: {ctype}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                    body.len()
                );
                let _ = sock.write_all(head.as_bytes()).await;
                let _ = sock.write_all(body).await;
                let _ = sock.shutdown().await;
            });
        }
    });
    format!("http://{addr}/")
}

fn test_client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}

#[tokio::test]
async fn http_loader_checks_status_and_content_type() {
    let base = spawn_image_server().await;
    let loader = HttpLoader::new(test_client());

    assert!(loader.load(&format!("{base}ok.jpg")).await.is_ok());
    assert!(matches!(
        loader.load(&format!("{base}missing.jpg")).await,
        Err(ProbeError::Status { status: 404, .. })
    ));
    assert!(matches!(
        loader.load(&format!("{base}page.html")).await,
        Err(ProbeError::NotAnImage { .. })
    ));
    assert!(matches!(
        loader.load("not a url").await,
        Err(ProbeError::InvalidUrl { .. })
    ));
}

#[tokio::test]
async fn asset_loader_joins_relative_paths_onto_base_url() {
    let base = spawn_image_server().await;
    let loader = probe::AssetLoader::new(
        test_client(),
        probe::AssetBase::Url(reqwest::Url::parse(&base).unwrap()),
    );
    let set = ImageResolver::new(Arc::new(loader))
        .timeout(Duration::from_millis(300))
        .resolve(&strings(&["img/b.jpg", "slow.jpg", "gone.jpg"]))
        .await;
    assert_eq!(set.images(), &strings(&["img/b.jpg"]));
}

#[tokio::test]
async fn catalog_loads_over_http_and_reports_status() {
    let base = spawn_image_server().await;
    let client = test_client();

    let ok = crate::catalog::DataSource::parse(&format!("{base}hairstyles.json")).unwrap();
    let catalog = crate::catalog::load(&ok, &client).await.unwrap();
    assert_eq!(catalog.entries[0].name, "Bob");

    let missing = crate::catalog::DataSource::parse(&format!("{base}nope.json")).unwrap();
    assert!(matches!(
        crate::catalog::load(&missing, &client).await,
        Err(crate::catalog::CatalogError::Status { status: 404, .. })
    ));
}

#[tokio::test]
async fn runner_resolves_images_next_to_the_data_file() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir(dir.path().join("images")).unwrap();
    std::fs::write(dir.path().join("images").join("a.jpg"), b"\xff\xd8\xff").unwrap();
    let data = r#"[
        {"name": "Bob", "length": "short", "style": "casual", "faceShapes": ["oval"],
         "images": ["./images/a.jpg", "./images/missing.jpg", " "], "description": "Classic"},
        {"name": "Ghost", "length": "long", "style": "casual", "faceShapes": ["round"],
         "images": ["./images/nope.jpg"], "description": "Nothing loads"}
    ]"#;
    let path = dir.path().join("hairstyles.json");
    std::fs::write(&path, data).unwrap();

    let runner = crate::runner::Runner::new(crate::runner::Options {
        data: path.to_string_lossy().to_string(),
        timeout: Duration::from_secs(1),
        ..Default::default()
    })
    .unwrap();
    let run = runner.run().await.unwrap();
    let cards = run.gallery.cards();
    assert_eq!(cards.len(), 2);
    assert_eq!(cards[0].display.images(), &strings(&["./images/a.jpg"]));
    assert!(cards[0].carousel.is_none());
    assert_eq!(cards[1].display.images(), &strings(&[probe::DEFAULT_IMAGE]));

    let page = run.page();
    assert_eq!(page.lengths, strings(&["short", "long"]));
    assert_eq!(page.face_shapes, strings(&["oval", "round"]));
}

#[tokio::test]
async fn image_timeout_does_not_limit_the_data_fetch() {
    let base = spawn_image_server().await;
    let runner = crate::runner::Runner::new(crate::runner::Options {
        data: format!("{base}slow-hairstyles.json"),
        timeout: Duration::from_millis(200),
        ..Default::default()
    })
    .unwrap();
    let run = runner.run().await.unwrap();
    let cards = run.gallery.cards();
    assert_eq!(cards.len(), 1);
    assert!(!cards[0].display.is_fallback());
}

#[tokio::test]
async fn runner_surfaces_missing_data_as_error() {
    let dir = tempfile::tempdir().unwrap();
    let runner = crate::runner::Runner::new(crate::runner::Options {
        data: dir.path().join("absent.json").to_string_lossy().to_string(),
        ..Default::default()
    })
    .unwrap();
    assert!(matches!(
        runner.run().await,
        Err(crate::runner::RunnerError::Catalog { .. })
    ));
}

#[test]
fn runner_rejects_invalid_options() {
    use crate::runner::{Options, Runner, RunnerError};

    assert!(matches!(
        Runner::new(Options {
            timeout: Duration::ZERO,
            ..Default::default()
        }),
        Err(RunnerError::InvalidTimeout)
    ));
    assert!(matches!(
        Runner::new(Options {
            swipe_threshold: 0.0,
            ..Default::default()
        }),
        Err(RunnerError::InvalidSwipeThreshold { .. })
    ));
    assert!(matches!(
        Runner::new(Options {
            base_url: Some("::nope".to_string()),
            ..Default::default()
        }),
        Err(RunnerError::InvalidBaseUrl { .. })
    ));
    assert!(matches!(
        Runner::new(Options {
            default_image: " ".to_string(),
            ..Default::default()
        }),
        Err(RunnerError::EmptyDefaultImage)
    ));
}
