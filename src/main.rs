mod game;
mod input;
mod settings;
mod storage;
mod time;
mod widgets;

use std::{cell::RefCell, io, rc::Rc};

use ratzilla::event::{KeyCode, MouseButton, MouseEventKind};
use ratzilla::ratatui::Terminal;
use ratzilla::{DomBackend, WebRenderer};
use wasm_bindgen::prelude::*;

use game::MakashaGame;
use input::{ClickState, InputEvent};
use storage::LocalStorage;

/// Wall clock in ms. Every timer in the session runs on this.
fn now_ms() -> u64 {
    js_sys::Date::now() as u64
}

fn init_logging() {
    #[cfg(target_arch = "wasm32")]
    console_log::init_with_level(log::Level::Info).ok();
    #[cfg(not(target_arch = "wasm32"))]
    env_logger::try_init().ok();
}

/// Stop the session when the page is hidden; a page restored from the
/// back/forward cache starts it again.
fn register_page_lifecycle(game: &Rc<RefCell<MakashaGame<LocalStorage>>>) {
    let Some(window) = web_sys::window() else {
        return;
    };

    let on_hide = Closure::<dyn FnMut(_)>::new({
        let game = game.clone();
        move |_event: web_sys::Event| game.borrow_mut().shutdown(now_ms())
    });
    if let Err(e) =
        window.add_event_listener_with_callback("pagehide", on_hide.as_ref().unchecked_ref())
    {
        log::warn!("pagehide listener not registered: {e:?}");
    }
    on_hide.forget();

    let on_show = Closure::<dyn FnMut(_)>::new({
        let game = game.clone();
        move |_event: web_sys::Event| game.borrow_mut().resume(now_ms())
    });
    if let Err(e) =
        window.add_event_listener_with_callback("pageshow", on_show.as_ref().unchecked_ref())
    {
        log::warn!("pageshow listener not registered: {e:?}");
    }
    on_show.forget();
}

/// Hit-test a mouse position (page pixels) against the last frame's targets.
fn dom_hit_test(mouse_x: u32, mouse_y: u32, cs: &ClickState) -> Option<u16> {
    let document = web_sys::window()?.document()?;

    // DomBackend creates a <div> as the grid container inside <body>.
    let grid = document.query_selector("body > div").ok()??;
    let rect = grid.get_bounding_client_rect();

    let hit = cs.hit_test_pixels(
        mouse_x as f64 - rect.left(),
        mouse_y as f64 - rect.top(),
        rect.width(),
        rect.height(),
    );
    log::debug!("tap at ({mouse_x}, {mouse_y}) -> {hit:?}");
    hit
}

fn main() -> io::Result<()> {
    console_error_panic_hook::set_once();
    init_logging();

    let game = Rc::new(RefCell::new(MakashaGame::new(LocalStorage)));
    game.borrow_mut().start(now_ms());
    register_page_lifecycle(&game);

    let click_state = Rc::new(RefCell::new(ClickState::new()));
    let backend = DomBackend::new()?;
    let terminal = Terminal::new(backend)?;

    terminal.on_mouse_event({
        let game = game.clone();
        let click_state = click_state.clone();
        move |mouse_event| {
            if mouse_event.event != MouseEventKind::Pressed
                || mouse_event.button != MouseButton::Left
            {
                return;
            }

            let action = {
                let cs = click_state.borrow();
                if cs.terminal_rows == 0 || cs.terminal_cols == 0 {
                    return;
                }
                dom_hit_test(mouse_event.x, mouse_event.y, &cs)
            };

            if let Some(id) = action {
                game.borrow_mut()
                    .handle_input(&InputEvent::Click(id), now_ms());
            }
        }
    });

    terminal.on_key_event({
        let game = game.clone();
        move |key_event| {
            if let KeyCode::Char(c) = key_event.code {
                game.borrow_mut().handle_input(&InputEvent::Key(c), now_ms());
            }
        }
    });

    terminal.draw_web(move |f| {
        let mut game = game.borrow_mut();
        game.pump(now_ms());

        let area = f.area();
        click_state.borrow_mut().begin_frame(area);
        game.render(f, area, &click_state);
    });

    Ok(())
}
