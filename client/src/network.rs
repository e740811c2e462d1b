use crate::input::parse_command;
use crate::rendering::Renderer;
use crate::session::{Event, Redraw, Session, Update};
use crate::timer::TimerDriver;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use log::{debug, error, info, warn};
use std::io::Stdout;
use std::time::Duration;
use tokio::io::{stdin, AsyncBufReadExt, BufReader};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

pub struct Client {
    ws_write: SplitSink<WsStream, Message>,
    ws_read: SplitStream<WsStream>,
    connected: bool,

    session: Session,
    renderer: Renderer<Stdout>,
    timer: TimerDriver,
}

impl Client {
    pub async fn connect(
        server_url: &str,
        player_id: String,
        tick: Duration,
    ) -> Result<Self, BoxError> {
        info!("Connecting to {}...", server_url);
        let (ws, _response) = connect_async(server_url).await?;
        let (ws_write, ws_read) = ws.split();

        Ok(Client {
            ws_write,
            ws_read,
            connected: true,
            session: Session::new(player_id),
            renderer: Renderer::new(std::io::stdout()),
            timer: TimerDriver::new(tick),
        })
    }

    /// Pushes frames to the relay. Once the transport is gone frames are
    /// dropped; there is no queue and no retry.
    async fn send_frames(&mut self, frames: Vec<String>) {
        for frame in frames {
            if !self.connected {
                debug!("Transport closed, skipping frame");
                continue;
            }

            if let Err(e) = self.ws_write.send(Message::Text(frame)).await {
                warn!("Send failed, connection treated as closed: {}", e);
                self.connected = false;
            }
        }
    }

    /// Turns one relay read into a session event. A close or read error marks
    /// the transport closed.
    fn read_event(&mut self, frame: Option<Result<Message, WsError>>) -> Option<Event> {
        match frame {
            Some(Ok(Message::Text(text))) => Some(Event::ServerText(text)),
            Some(Ok(Message::Close(_))) | None => {
                warn!("Relay closed the connection");
                self.connected = false;
                None
            }
            Some(Ok(_)) => None,
            Some(Err(e)) => {
                warn!("Connection error: {}", e);
                self.connected = false;
                None
            }
        }
    }

    async fn dispatch(&mut self, event: Event) -> bool {
        let Update {
            frames,
            redraw,
            quit,
        } = self.session.handle(event);

        self.send_frames(frames).await;

        let drawn = match redraw {
            Redraw::None => Ok(()),
            Redraw::Clocks => self.renderer.render_clocks(&self.session),
            Redraw::Full => self.renderer.render(&self.session),
        };
        if let Err(e) = drawn {
            error!("Failed to draw: {}", e);
        }

        quit
    }

    pub async fn run(&mut self) -> Result<(), BoxError> {
        info!("Session id {}", self.session.player_id());

        self.dispatch(Event::Connected).await;
        // Nothing to load in a terminal, so assets are ready immediately
        self.dispatch(Event::AssetsReady).await;

        let mut ticker = self.timer.start().await;
        let mut lines = BufReader::new(stdin()).lines();
        let mut stdin_open = true;

        loop {
            let event = tokio::select! {
                frame = self.ws_read.next(), if self.connected => match self.read_event(frame) {
                    Some(event) => event,
                    None => continue,
                },

                _ = ticker.tick() => Event::Tick,

                line = lines.next_line(), if stdin_open => match line {
                    Ok(Some(line)) => match parse_command(&line) {
                        Ok(Some(command)) => Event::Command(command),
                        Ok(None) => continue,
                        Err(e) => {
                            println!("> {}", e);
                            continue;
                        }
                    },
                    Ok(None) => {
                        info!("Input closed");
                        stdin_open = false;
                        continue;
                    }
                    Err(e) => {
                        error!("Error reading input: {}", e);
                        stdin_open = false;
                        continue;
                    }
                },
            };

            if self.dispatch(event).await {
                break;
            }
        }

        if self.connected {
            let _ = self.ws_write.send(Message::Close(None)).await;
        }

        Ok(())
    }
}
