//! Sends a few requests through a scripted transport and prints what the
//! decoder makes of each response.
//!
//! ```sh
//! cargo run -p micro-fetch --example decode_response
//! ```

use micro_fetch::codec::parse_fn;
use micro_fetch::transport::{OutgoingRequest, RawResponse, TransportError, fn_transport};
use micro_fetch::{Request, Value};
use serde_json::json;
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;

fn scripted(request: &OutgoingRequest) -> Result<RawResponse, TransportError> {
    info!(head = %request.raw_headers().trim_end(), "transmitting");

    let response = match request.uri() {
        "http://api.example.com/users" => RawResponse::new(
            "HTTP/1.1 201 Created\r\nContent-Type: application/json; charset=utf-8\r\n",
            r#"{"id":7,"name":"nathan"}"#,
        ),
        "http://api.example.com/report" => RawResponse::new(
            "HTTP/1.1 200 OK\r\nContent-Type: text/csv\r\n",
            "Key1,Key2\nValue1,Value2\n\"40.0\",\"Forty\"",
        ),
        "http://api.example.com/message" => RawResponse::new(
            "HTTP/1.1 200 OK\r\nContent-Type: application/vnd.example.message+xml\r\n",
            "<message><to>nathan</to></message>",
        ),
        "http://api.example.com/shout" => {
            RawResponse::new("HTTP/1.1 200 OK\r\nContent-Type: text/x-shout\r\n", "hello")
        }
        uri => return Err(TransportError::connection_refused(uri)),
    };
    Ok(response)
}

fn main() {
    let subscriber = FmtSubscriber::builder().with_max_level(Level::DEBUG).finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let transport = fn_transport(scripted);
    micro_fetch::register("text/x-shout", parse_fn(|body| Ok(Value::from(body.to_uppercase()))));

    let requests = [
        Request::post_with("http://api.example.com/users", json!({"name": "nathan"})).sends_and_expects("json"),
        Request::get("http://api.example.com/report").expects_csv(),
        Request::get("http://api.example.com/message").expects_xml(),
        Request::get("http://api.example.com/shout"),
        Request::get("http://api.example.com/missing").when_error(|error| error!(%error, "request failed")),
    ];

    for request in requests {
        match request.send(&transport) {
            Ok(response) => info!(
                code = response.code(),
                content_type = response.content_type(),
                parent_type = ?response.parent_type(),
                body = ?response.body(),
                "decoded response"
            ),
            Err(e) => error!(error = %e, "no response"),
        }
    }
}
