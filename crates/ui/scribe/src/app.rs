use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::layout::{Layout, Rect};
use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::{
    action::Action,
    components::{Component, status_bar::StatusBar, user_form::UserForm},
    config::Config,
    tui::{Event, EventResponse, Frame, Tui},
};

pub struct App {
    config: Config,
    components: Vec<Box<dyn Component>>,
    should_quit: bool,
    should_suspend: bool,
}

/// Keys handled after every component passed on the event.
fn global_action(key: KeyEvent) -> Option<Action> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Esc => Some(Action::Quit),
        KeyCode::Char('c') if ctrl => Some(Action::Quit),
        KeyCode::Char('z') if ctrl => Some(Action::Suspend),
        _ => None,
    }
}

impl App {
    pub fn new(config: Config) -> Result<Self> {
        let mode = config.validation_mode;
        Ok(Self {
            components: vec![
                Box::new(UserForm::new(config.title.clone(), mode)),
                Box::new(StatusBar::new(mode)),
            ],
            config,
            should_quit: false,
            should_suspend: false,
        })
    }

    fn new_tui(&self) -> Result<Tui> {
        Ok(Tui::new()?
            .tick_rate(self.config.tick_rate)
            .frame_rate(self.config.frame_rate))
    }

    pub async fn run(&mut self) -> Result<()> {
        let (action_tx, mut action_rx) = mpsc::unbounded_channel::<Action>();

        let mut tui = self.new_tui()?;
        tui.enter()?;
        for component in self.components.iter_mut() {
            component.register_action_handler(action_tx.clone())?;
        }
        info!(
            mode = %self.config.validation_mode,
            title = %self.config.title,
            "form ready"
        );

        loop {
            if let Some(e) = tui.next().await {
                let mut stop_event_propagation = false;
                for component in self.components.iter_mut() {
                    match component.handle_events(e.clone())? {
                        Some(EventResponse::Continue(action)) => {
                            action_tx.send(action).ok();
                        }
                        Some(EventResponse::Stop(action)) => {
                            action_tx.send(action).ok();
                            stop_event_propagation = true;
                            break;
                        }
                        None => {}
                    }
                }

                if !stop_event_propagation {
                    match e {
                        Event::Tick => {
                            action_tx.send(Action::Tick).ok();
                        }
                        Event::Render => {
                            action_tx.send(Action::Render).ok();
                        }
                        Event::Resize(x, y) => {
                            action_tx.send(Action::Resize(x, y)).ok();
                        }
                        Event::Error => {
                            action_tx
                                .send(Action::Error("terminal event stream failed".into()))
                                .ok();
                        }
                        Event::Key(key) => {
                            if let Some(action) = global_action(key) {
                                action_tx.send(action).ok();
                            }
                        }
                    }
                }
            }

            while let Ok(action) = action_rx.try_recv() {
                match action {
                    Action::Tick | Action::Render => {}
                    _ => debug!("{action}"),
                }
                match action {
                    Action::Quit => self.should_quit = true,
                    Action::Suspend => self.should_suspend = true,
                    Action::Resume => self.should_suspend = false,
                    Action::Error(ref message) => error!(%message, "application error"),
                    Action::Resize(w, h) => {
                        tui.resize(Rect::new(0, 0, w, h))?;
                        self.draw(&mut tui, &action_tx)?;
                    }
                    Action::Render => self.draw(&mut tui, &action_tx)?,
                    _ => {}
                }

                for component in self.components.iter_mut() {
                    if let Some(next) = component.update(action.clone())? {
                        action_tx.send(next).ok();
                    }
                }
            }

            if self.should_suspend {
                tui.suspend()?;
                action_tx.send(Action::Resume).ok();
                tui = self.new_tui()?;
                tui.enter()?;
            } else if self.should_quit {
                tui.stop()?;
                break;
            }
        }
        tui.exit()?;
        Ok(())
    }

    fn draw(&mut self, tui: &mut Tui, action_tx: &mpsc::UnboundedSender<Action>) -> Result<()> {
        tui.draw(|f| {
            if let Err(err) = self.render(f) {
                action_tx
                    .send(Action::Error(format!("Failed to draw: {err:?}")))
                    .ok();
            }
        })?;
        Ok(())
    }

    fn render(&mut self, frame: &mut Frame<'_>) -> Result<()> {
        let constraints: Vec<_> = self
            .components
            .iter()
            .map(|component| component.height_constraint())
            .collect();
        let areas = Layout::vertical(constraints).split(frame.area());
        for (component, area) in self.components.iter_mut().zip(areas.iter()) {
            component.draw(frame, *area)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use ratatui::{Terminal, backend::TestBackend};

    #[test]
    fn global_keys() {
        let plain = |code| KeyEvent::new(code, KeyModifiers::NONE);
        let ctrl = |c| KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL);

        assert_eq!(global_action(plain(KeyCode::Esc)), Some(Action::Quit));
        assert_eq!(global_action(ctrl('c')), Some(Action::Quit));
        assert_eq!(global_action(ctrl('z')), Some(Action::Suspend));
        assert_eq!(global_action(plain(KeyCode::Char('c'))), None);
    }

    #[test]
    fn renders_form_above_status_bar() {
        let mut app = App::new(Config::default()).unwrap();
        let mut terminal = Terminal::new(TestBackend::new(80, 30)).unwrap();
        terminal.draw(|f| app.render(f).unwrap()).unwrap();

        let buffer = terminal.backend().buffer();
        let top: String = (0..buffer.area.width)
            .map(|x| buffer[(x, 0)].symbol().to_string())
            .collect();
        let bottom: String = (0..buffer.area.width)
            .map(|x| buffer[(x, buffer.area.height - 1)].symbol().to_string())
            .collect();

        assert!(top.contains("User record"));
        assert!(bottom.contains("onTouched"));
    }
}
