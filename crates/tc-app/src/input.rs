//! Lecture clavier sur un thread dédié.
//!
//! crossterm only offers a blocking `read`; the worker blocks on it and
//! forwards key presses through a channel that the render loop drains with
//! `try_recv`, so a keyboard-idle user never stalls rendering.

use std::io;

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use flume::{Receiver, TryRecvError};
use tc_core::frame::KeyPress;
use tc_core::traits::InputSource;

/// Traduit un événement terminal en touche. `None` pour tout ce qui n'est
/// pas un appui de touche (relâchement, resize, souris, collage).
///
/// # Example
/// ```
/// use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};
/// use tc_app::input::map_event;
/// use tc_core::frame::KeyPress;
///
/// let ctrl_c = Event::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
/// assert_eq!(map_event(&ctrl_c), Some(KeyPress::Interrupt));
/// assert_eq!(map_event(&Event::Resize(80, 24)), None);
/// ```
#[must_use]
pub fn map_event(event: &Event) -> Option<KeyPress> {
    let Event::Key(KeyEvent {
        code,
        modifiers,
        kind: KeyEventKind::Press,
        ..
    }) = *event
    else {
        return None;
    };

    Some(match code {
        KeyCode::Esc => KeyPress::Escape,
        KeyCode::Char('c' | 'C') if modifiers.contains(KeyModifiers::CONTROL) => {
            KeyPress::Interrupt
        }
        KeyCode::Char(c) => KeyPress::Char(c),
        _ => KeyPress::Other,
    })
}

/// InputSource alimentée par le thread `input_reader`.
pub struct KeyboardWorker {
    rx: Receiver<KeyPress>,
}

impl KeyboardWorker {
    /// Lance le lecteur clavier crossterm.
    ///
    /// # Errors
    /// Returns an error if the thread cannot be spawned.
    pub fn spawn() -> Result<Self> {
        Self::spawn_with(event::read)
    }

    /// Spawn the worker around any blocking event reader.
    ///
    /// The worker stops when the reader fails or when the `KeyboardWorker`
    /// (the receiving end) is dropped and the next key arrives.
    ///
    /// # Errors
    /// Returns an error if the thread cannot be spawned.
    pub fn spawn_with<F>(mut read: F) -> Result<Self>
    where
        F: FnMut() -> io::Result<Event> + Send + 'static,
    {
        let (tx, rx) = flume::unbounded();
        std::thread::Builder::new()
            .name("input_reader".into())
            .spawn(move || {
                loop {
                    match read() {
                        Ok(ev) => {
                            if let Some(key) = map_event(&ev)
                                && tx.send(key).is_err()
                            {
                                break; // receiver dropped
                            }
                        }
                        Err(e) => {
                            log::warn!("Lecture clavier interrompue : {e}");
                            break;
                        }
                    }
                }
            })
            .context("Impossible de lancer le thread clavier")?;

        Ok(Self { rx })
    }
}

impl InputSource for KeyboardWorker {
    fn poll_key(&mut self) -> Result<Option<KeyPress>> {
        match self.rx.try_recv() {
            Ok(key) => Ok(Some(key)),
            Err(TryRecvError::Empty) => Ok(None),
            // Les touches déjà reçues sont rendues avant la déconnexion.
            Err(TryRecvError::Disconnected) => {
                anyhow::bail!("Thread clavier arrêté : Échap et Ctrl+C ne sont plus lisibles")
            }
        }
    }
}
