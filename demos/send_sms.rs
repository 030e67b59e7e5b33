use std::sync::Arc;

use smsgate::{BlocklistStore, Config, MessageHistory, PhoneNumber, SmsSender, handle_send_json};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    smsgate::logging::init(&config.log_level.0);

    let phone = std::env::var("SMSGATE_PHONE").unwrap_or_else(|_| "+1234567890".to_owned());
    let message = std::env::var("SMSGATE_MESSAGE")
        .unwrap_or_else(|_| "Hello from the smsgate demo.".to_owned());

    let blocklist = Arc::new(config.blocklist());
    let (sink, rx) = config.event_sink();
    let sender = SmsSender::new(blocklist.clone(), config.gateway.build()?, Arc::new(sink));

    let history = Arc::new(MessageHistory::default());
    let consumer = tokio::spawn({
        let history = Arc::clone(&history);
        async move { history.consume(rx).await }
    });

    let body = serde_json::json!({ "phoneNumber": phone, "message": message }).to_string();
    let response = handle_send_json(&sender, &body).await?;
    println!("result: {}, status: {}", response.result, response.status);

    blocklist.add(&PhoneNumber::new(phone.clone())?).await?;
    let response = handle_send_json(&sender, &body).await?;
    println!("result: {}, status: {}", response.result, response.status);

    drop(sender);
    let stored = consumer.await?;
    println!("consumer stored {stored} events");
    for entry in history.messages(&PhoneNumber::new(phone)?) {
        println!("  {:?} -> {}", entry.message, entry.status);
    }

    Ok(())
}
