//! Interactive peer.
//!
//! Reads lines from stdin and sends each as a text message; prints every
//! broadcast it receives. Typing `exit` or pressing Ctrl-C performs a
//! clean close handshake. The peer keeps no shared state.

use crate::error::ClientError;
use hub_proto::transport::websocket;
use hub_proto::{CloseNotice, Frame, FrameSink, FrameSource};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_tungstenite::connect_async;
use tracing::debug;

/// Line that ends the session instead of being sent.
pub const EXIT_COMMAND: &str = "exit";

/// How long to wait for the server's close reply.
const CLOSE_GRACE: Duration = Duration::from_secs(2);

/// What a line of user input means.
#[derive(Debug, PartialEq, Eq)]
pub enum Input<'a> {
    Send(&'a str),
    Exit,
}

/// Interpret one line of user input. Surrounding whitespace is dropped.
pub fn parse_input(line: &str) -> Input<'_> {
    match line.trim() {
        EXIT_COMMAND => Input::Exit,
        text => Input::Send(text),
    }
}

/// WebSocket URL for a hub.
pub fn endpoint(host: &str, port: u16, path: &str) -> String {
    format!("ws://{host}:{port}{path}")
}

/// How a received broadcast is shown to the user.
pub fn render_broadcast(text: &str) -> String {
    format!("\n[Broadcast] : {text}")
}

/// Connect to a hub and run the interactive loop until the user leaves or
/// the server closes the connection.
pub async fn connect(host: &str, port: u16, path: &str) -> Result<(), ClientError> {
    let url = endpoint(host, port, path);
    let (stream, _) = connect_async(url.as_str())
        .await
        .map_err(|e| ClientError::Connect {
            url: url.clone(),
            reason: e.to_string(),
        })?;

    println!("Connected to the broadcast server.");
    println!("Type your message and press Enter to send. Type '{EXIT_COMMAND}' to quit.");

    let (mut sink, mut source) = websocket::split(stream);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    let closing = loop {
        tokio::select! {
            line = lines.next_line() => match line? {
                Some(line) => match parse_input(&line) {
                    Input::Exit => {
                        println!("Disconnecting...");
                        break true;
                    }
                    Input::Send(text) => sink.send_text(text).await?,
                },
                None => break true,
            },
            frame = source.next_frame() => match frame {
                Ok(Some(Frame::Text(text))) => println!("{}", render_broadcast(&text)),
                Ok(Some(Frame::Close(notice))) => {
                    debug!(?notice, "Server closed connection");
                    println!("Connection closed by server.");
                    break false;
                }
                Ok(None) | Err(_) => {
                    println!("Connection closed by server.");
                    break false;
                }
            },
            _ = tokio::signal::ctrl_c() => {
                println!("Closing connection...");
                break true;
            }
        }
    };

    if closing {
        sink.send_close(Some(CloseNotice::normal())).await?;
        // Wait for the server's close reply so the handshake completes.
        let _ = tokio::time::timeout(CLOSE_GRACE, async {
            while let Ok(Some(frame)) = source.next_frame().await {
                if matches!(frame, Frame::Close(_)) {
                    break;
                }
            }
        })
        .await;
    }

    if let Err(e) = sink.close().await {
        debug!(error = %e, "Error closing connection");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_is_recognised_with_surrounding_whitespace() {
        assert_eq!(parse_input("exit"), Input::Exit);
        assert_eq!(parse_input("  exit \r"), Input::Exit);
        assert_eq!(parse_input("exit now"), Input::Send("exit now"));
        assert_eq!(parse_input(" hello "), Input::Send("hello"));
    }

    #[test]
    fn endpoint_includes_path() {
        assert_eq!(endpoint("localhost", 8080, "/ws"), "ws://localhost:8080/ws");
    }

    #[test]
    fn broadcasts_are_labelled() {
        assert_eq!(render_broadcast("client1: hi"), "\n[Broadcast] : client1: hi");
    }
}
