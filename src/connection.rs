use std::{collections::VecDeque, sync::Arc};

use futures::{SinkExt, StreamExt};
use tokio::{net::TcpStream, sync::Mutex};
use tokio_util::codec::Framed;
use tracing::{debug, instrument, warn};

use crate::{
    codec::RespCodec,
    commands::CommandDispatcher,
    config::ServerConfig,
    key_value_store::KeyValueStore,
    resp::{RespError, RespValue},
    state::State,
};

/// Requests read ahead while a command is still running. Past this the socket
/// is left alone until the command finishes.
const MAX_READ_AHEAD: usize = 1024;

/// Serves one client until it disconnects.
///
/// Requests are answered strictly in arrival order, one reply each. A framing
/// error ends the connection after a best-effort error reply, since the rest of
/// the byte stream can no longer be trusted.
///
/// The socket is still read while a command runs. If the client hangs up
/// meanwhile, a blocked BLPOP or XREAD is told to give up, so it neither
/// lingers in the blocking registry nor takes data nobody will receive.
#[instrument(name = "connection", skip(stream, store, state, config))]
pub async fn handle_client_connection(
    stream: TcpStream,
    client_address: String,
    store: Arc<KeyValueStore>,
    state: Arc<Mutex<State>>,
    config: Arc<ServerConfig>,
) {
    let codec =
        RespCodec::new(config.max_frame_size).with_max_nesting_depth(config.max_nesting_depth);
    let mut framed = Framed::new(stream, codec);
    let mut dispatcher = CommandDispatcher::new(client_address, store, state, config);
    let client_closed = dispatcher.client_closed();
    let mut read_ahead: VecDeque<RespValue> = VecDeque::new();

    loop {
        let request = match read_ahead.pop_front() {
            Some(request) => request,
            None => match framed.next().await {
                Some(Ok(request)) => request,
                Some(Err(e)) => {
                    report_read_error(&mut framed, e).await;
                    break;
                }
                None => break,
            },
        };

        debug!(?request, "received request");

        let mut read_error = None;
        let response = {
            let dispatch = dispatcher.dispatch(request);
            tokio::pin!(dispatch);
            let mut reading = read_ahead.len() < MAX_READ_AHEAD;

            loop {
                tokio::select! {
                    biased;
                    response = &mut dispatch => break response,
                    frame = framed.next(), if reading => match frame {
                        Some(Ok(next)) => {
                            read_ahead.push_back(next);
                            reading = read_ahead.len() < MAX_READ_AHEAD;
                        }
                        Some(Err(e)) => {
                            client_closed.cancel();
                            read_error = Some(e);
                            reading = false;
                        }
                        None => {
                            client_closed.cancel();
                            reading = false;
                        }
                    },
                }
            }
        };

        if let Some(e) = read_error {
            report_read_error(&mut framed, e).await;
            break;
        }

        if client_closed.is_cancelled() {
            debug!("client hung up while a command was running");
            break;
        }

        if let Err(e) = framed.send(response).await {
            warn!(error = %e, "failed to write to client");
            break;
        }
    }

    debug!("connection closed");
}

async fn report_read_error(framed: &mut Framed<TcpStream, RespCodec>, error: RespError) {
    match error {
        RespError::UnexpectedEof => debug!("client closed the connection mid-frame"),
        RespError::Io(e) => warn!(error = %e, "failed to read from client"),
        e => {
            warn!(error = %e, "closing connection after a framing error");

            if let Err(e) = framed.send(e.as_resp()).await {
                debug!(error = %e, "could not send the framing error");
            }
        }
    }
}
