//! Line-oriented browse session over a rendered [`Gallery`].
//!
//! Each line is one UI event: a facet change (which re-renders every card) or
//! an input routed to a single card's carousel.

use crate::carousel::{CarouselInput, ClickTarget, InputEffect, NavKey};
use crate::filter::Facet;
use crate::gallery::{CardView, Gallery, GalleryView};

pub const HELP: &str = "commands:
  show                         list the current cards
  filter <facet> [value]       set length|style|face (no value clears it)
  clear                        clear every facet
  next <card> | prev <card>    press a card's nav control
  jump <card> <image>          click a position dot (1-based)
  click <card> image|next|prev|dot <image>
  swipe <card> <from-x> <to-x> touch swipe across a card
  focus <card>                 give a card keyboard focus
  key left|right               arrow key on the focused card
  help | quit";

#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    Show,
    Filter(Facet, Option<String>),
    Clear,
    Input(usize, CarouselInput),
    Swipe { slot: usize, from: f32, to: f32 },
    Focus(usize),
    Key(NavKey),
    Help,
    Quit,
}

fn parse_slot(value: Option<&str>) -> Result<usize, String> {
    let raw = value.ok_or_else(|| "missing card number".to_string())?;
    raw.parse::<usize>()
        .map_err(|_| format!("invalid card number '{raw}'"))
}

/// 1-based position as typed by the user, returned 0-based.
fn parse_position(value: Option<&str>) -> Result<usize, String> {
    let raw = value.ok_or_else(|| "missing image position".to_string())?;
    match raw.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n - 1),
        _ => Err(format!("invalid image position '{raw}'")),
    }
}

fn parse_x(value: Option<&str>) -> Result<f32, String> {
    let raw = value.ok_or_else(|| "missing x coordinate".to_string())?;
    raw.parse::<f32>()
        .ok()
        .filter(|x| x.is_finite())
        .ok_or_else(|| format!("invalid x coordinate '{raw}'"))
}

pub fn parse_command(line: &str) -> Result<Option<Command>, String> {
    let mut parts = line.split_whitespace();
    let Some(head) = parts.next() else {
        return Ok(None);
    };
    let cmd = match head.to_lowercase().as_str() {
        "show" | "ls" => Command::Show,
        "filter" => {
            let facet_raw = parts.next().ok_or_else(|| "missing facet".to_string())?;
            let facet =
                Facet::parse(facet_raw).ok_or_else(|| format!("unknown facet '{facet_raw}'"))?;
            let value = parts.collect::<Vec<_>>().join(" ");
            let value = if value.is_empty() { None } else { Some(value) };
            Command::Filter(facet, value)
        }
        "clear" => Command::Clear,
        "next" => Command::Input(
            parse_slot(parts.next())?,
            CarouselInput::Click(ClickTarget::NextControl),
        ),
        "prev" => Command::Input(
            parse_slot(parts.next())?,
            CarouselInput::Click(ClickTarget::PrevControl),
        ),
        "jump" => {
            let slot = parse_slot(parts.next())?;
            let pos = parse_position(parts.next())?;
            Command::Input(slot, CarouselInput::Click(ClickTarget::Dot(pos)))
        }
        "click" => {
            let slot = parse_slot(parts.next())?;
            let target = match parts.next().map(|t| t.to_lowercase()).as_deref() {
                Some("image") | Some("img") => ClickTarget::Image,
                Some("next") => ClickTarget::NextControl,
                Some("prev") => ClickTarget::PrevControl,
                Some("dot") => ClickTarget::Dot(parse_position(parts.next())?),
                Some(_) => ClickTarget::Other,
                None => return Err("missing click target".to_string()),
            };
            Command::Input(slot, CarouselInput::Click(target))
        }
        "swipe" => Command::Swipe {
            slot: parse_slot(parts.next())?,
            from: parse_x(parts.next())?,
            to: parse_x(parts.next())?,
        },
        "focus" => Command::Focus(parse_slot(parts.next())?),
        "key" => {
            let raw = parts.next().ok_or_else(|| "missing key".to_string())?;
            Command::Key(NavKey::parse(raw))
        }
        "help" | "?" => Command::Help,
        "quit" | "exit" | "q" => Command::Quit,
        other => return Err(format!("unknown command '{other}' (try 'help')")),
    };
    Ok(Some(cmd))
}

pub fn describe_effect(slot: usize, effect: InputEffect) -> String {
    match effect {
        InputEffect::Moved { from, to } => {
            format!("card {slot}: image {} -> {}", from + 1, to + 1)
        }
        InputEffect::GestureClaimed => format!("card {slot}: gesture claimed"),
        InputEffect::Ignored => format!("card {slot}: ignored"),
    }
}

fn describe_card(card: &CardView) -> String {
    let strip: String = card
        .images
        .iter()
        .map(|i| if i.active { '●' } else { '○' })
        .collect();
    let mut line = format!(
        "[{}] {} ({}, {}) {}",
        card.slot, card.name, card.length, card.style, strip
    );
    if card.fallback {
        line.push_str(" (default image)");
    }
    line
}

pub fn describe_gallery(gallery: &Gallery) -> String {
    match gallery.view() {
        GalleryView::NoResults => "no hairstyles match the selected filters".to_string(),
        GalleryView::Cards(cards) => cards
            .iter()
            .map(describe_card)
            .collect::<Vec<_>>()
            .join("\n"),
    }
}

/// Runs one command. `Quit` is handled by the caller.
pub async fn execute(gallery: &mut Gallery, cmd: Command) -> Result<String, String> {
    match cmd {
        Command::Show => Ok(describe_gallery(gallery)),
        Command::Filter(facet, value) => {
            gallery.set_facet(facet, value.as_deref()).await;
            Ok(describe_gallery(gallery))
        }
        Command::Clear => {
            gallery.render(Default::default()).await;
            Ok(describe_gallery(gallery))
        }
        Command::Input(slot, input) => {
            let id = gallery.card_id(slot).map_err(|e| e.to_string())?;
            let effect = gallery.dispatch(id, input).map_err(|e| e.to_string())?;
            Ok(describe_effect(slot, effect))
        }
        Command::Swipe { slot, from, to } => {
            let id = gallery.card_id(slot).map_err(|e| e.to_string())?;
            gallery
                .dispatch(id, CarouselInput::TouchStart { x: from })
                .map_err(|e| e.to_string())?;
            gallery
                .dispatch(id, CarouselInput::TouchMove { x: to, y: 0.0 })
                .map_err(|e| e.to_string())?;
            let effect = gallery
                .dispatch(id, CarouselInput::TouchEnd { x: to })
                .map_err(|e| e.to_string())?;
            Ok(describe_effect(slot, effect))
        }
        Command::Focus(slot) => {
            let id = gallery.card_id(slot).map_err(|e| e.to_string())?;
            gallery.focus(id).map_err(|e| e.to_string())?;
            Ok(format!("card {slot}: focused"))
        }
        Command::Key(key) => match gallery.focused() {
            Some(id) => Ok(describe_effect(id.slot, gallery.key(key))),
            None => Err("no card has focus (use 'focus <card>')".to_string()),
        },
        Command::Help => Ok(HELP.to_string()),
        Command::Quit => Ok(String::new()),
    }
}
