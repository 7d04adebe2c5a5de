// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use crate::binding::TapBinding;
use crate::chain::{ChainState, Message, MessageKind, MessageListener, ProcessingChain};
use crate::config::consts::P25_SYNC_PATTERN;
use crate::errors::{ChainError, TapError};
use crate::modules::{C4fmDecoder, C4fmDecoderConfig, FmDemodulator, PowerMeter};
use crate::source::{SignalKind, SyntheticSource, SyntheticSourceConfig};
use crate::tap::{CollectingListener, Tap, TapListener, TapPayload, TapType};
use crate::traits::{Module, SampleBuffer};

fn source(signal: SignalKind, buffer_count: Option<u64>) -> Box<SyntheticSource> {
    Box::new(SyntheticSource::new(SyntheticSourceConfig {
        signal,
        buffer_size: 480,
        buffer_count,
        sync_interval: 96,
        ..Default::default()
    }))
}

fn c4fm_decoder(id: &str) -> Arc<dyn Module> {
    Arc::new(C4fmDecoder::new(
        id,
        C4fmDecoderConfig {
            sample_rate: 48_000.0,
            samples_per_symbol: 10,
            deviation_hz: 600.0,
            sync_pattern: P25_SYNC_PATTERN,
            max_sync_bit_errors: 0,
            batch_size: 4,
        },
    ))
}

fn modules() -> Vec<Arc<dyn Module>> {
    vec![
        Arc::new(FmDemodulator::new("fm", 16)),
        c4fm_decoder("c4fm"),
        Arc::new(PowerMeter::new("power", 5)),
    ]
}

fn attached_chain(buffer_count: Option<u64>) -> ProcessingChain {
    let mut chain = ProcessingChain::new();
    chain.add_modules(modules()).unwrap();
    chain.set_source(source(SignalKind::C4fm, buffer_count)).unwrap();
    chain
}

fn wait_until(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(2));
    }
    condition()
}

fn run_to_exhaustion(chain: &mut ProcessingChain) {
    chain.start().unwrap();
    assert!(wait_until(Duration::from_secs(10), || !chain.is_producing()));
    chain.stop().unwrap();
}

#[derive(Default)]
struct MessageLog(Mutex<Vec<Message>>);

impl MessageListener for MessageLog {
    fn receive(&self, message: &Message) -> anyhow::Result<()> {
        self.0.lock().unwrap().push(message.clone());
        Ok(())
    }
}

impl MessageLog {
    fn messages(&self) -> Vec<Message> {
        self.0.lock().unwrap().clone()
    }
}

#[test]
fn test_state_machine_transitions() {
    let mut chain = ProcessingChain::new();
    assert_eq!(chain.state(), ChainState::Created);
    assert!(matches!(
        chain.start(),
        Err(ChainError::InvalidTransition { state: ChainState::Created, .. })
    ));

    chain.add_modules(modules()).unwrap();
    assert_eq!(chain.state(), ChainState::ModulesAttached);
    assert!(matches!(
        chain.add_modules(modules()),
        Err(ChainError::InvalidTransition { .. })
    ));
    assert!(matches!(chain.start(), Err(ChainError::MissingSource)));

    chain.set_source(source(SignalKind::Tone, None)).unwrap();
    chain.start().unwrap();
    assert_eq!(chain.state(), ChainState::Running);
    assert!(matches!(
        chain.set_source(source(SignalKind::Tone, None)),
        Err(ChainError::InvalidTransition { state: ChainState::Running, .. })
    ));
    assert!(chain
        .add_message_listener(Arc::new(MessageLog::default()))
        .is_err());

    chain.stop().unwrap();
    assert_eq!(chain.state(), ChainState::Stopped);
    chain.stop().unwrap();
    assert!(matches!(
        chain.start(),
        Err(ChainError::InvalidTransition { state: ChainState::Stopped, .. })
    ));
}

#[test]
fn test_stop_before_start() {
    let mut chain = ProcessingChain::new();
    chain.stop().unwrap();
    assert_eq!(chain.state(), ChainState::Stopped);

    let mut attached = attached_chain(Some(1));
    attached.stop().unwrap();
    assert_eq!(attached.state(), ChainState::Stopped);
    assert_eq!(attached.stats().buffers_processed, 0);
}

#[test]
fn test_add_modules_rejects_bad_lists() {
    let mut chain = ProcessingChain::new();
    assert!(matches!(chain.add_modules(vec![]), Err(ChainError::NoModules)));

    let duplicate: Vec<Arc<dyn Module>> = vec![
        Arc::new(FmDemodulator::new("x", 8)),
        Arc::new(PowerMeter::new("x", 1)),
    ];
    assert!(matches!(
        chain.add_modules(duplicate),
        Err(ChainError::DuplicateModule(id)) if id == "x"
    ));
    assert_eq!(chain.state(), ChainState::Created);
}

#[test]
fn test_every_module_sees_every_buffer() {
    let mut chain = attached_chain(Some(10));
    let binding = TapBinding::new(chain.modules());
    let demodulated = Arc::new(CollectingListener::new());
    binding
        .select("fm", &Tap::new("Demodulated", TapType::StreamFloat), demodulated.clone())
        .unwrap();

    run_to_exhaustion(&mut chain);

    let stats = chain.stats();
    assert_eq!(stats.buffers_processed, 10);
    assert_eq!(stats.samples_processed, 4_800);
    assert_eq!(demodulated.unit_count(), 4_800);
}

#[test]
fn test_message_listeners_receive_sync_and_power() {
    let mut chain = attached_chain(Some(10));
    let log = Arc::new(MessageLog::default());
    chain.add_message_listener(log.clone()).unwrap();

    run_to_exhaustion(&mut chain);

    let messages = log.messages();
    let syncs: Vec<&Message> = messages
        .iter()
        .filter(|m| matches!(m.kind, MessageKind::SyncDetected { .. }))
        .collect();
    // 480 symbols in frames of 120 dibits.
    assert_eq!(syncs.len(), 4);
    assert!(syncs.iter().all(|m| m.source_module == "c4fm"));
    assert_eq!(syncs[0].sample_index, 239);

    let power = messages
        .iter()
        .filter(|m| matches!(m.kind, MessageKind::SignalPower { .. }))
        .count();
    assert_eq!(power, 2);
    assert_eq!(chain.stats().messages_emitted, 6);
}

#[test]
fn test_failing_message_listeners_are_isolated() {
    let mut chain = attached_chain(Some(10));
    let failing = |_: &Message| -> anyhow::Result<()> { anyhow::bail!("listener offline") };
    let panicking = |_: &Message| -> anyhow::Result<()> { panic!("listener bug") };
    let log = Arc::new(MessageLog::default());

    chain.add_message_listener(Arc::new(failing)).unwrap();
    chain.add_message_listener(Arc::new(panicking)).unwrap();
    chain.add_message_listener(log.clone()).unwrap();

    run_to_exhaustion(&mut chain);

    assert_eq!(log.messages().len(), 6);
    assert_eq!(chain.stats().buffers_processed, 10);
}

#[test]
fn test_stop_clears_all_taps() {
    let mut chain = attached_chain(None);
    let binding = TapBinding::new(chain.modules());
    let symbols = Arc::new(CollectingListener::new());
    let dibits = Arc::new(CollectingListener::new());
    binding
        .select("c4fm", &Tap::new("Symbol", TapType::StreamSymbol), symbols.clone())
        .unwrap();
    binding
        .select("c4fm", &Tap::new("Dibit Stream", TapType::StreamDibit), dibits.clone())
        .unwrap();
    binding
        .select("fm", &Tap::new("Baseband", TapType::StreamComplexSample), Arc::new(CollectingListener::new()))
        .unwrap();

    chain.start().unwrap();
    assert!(wait_until(Duration::from_secs(10), || dibits.unit_count() > 0));
    chain.stop().unwrap();

    assert!(binding.selected().is_empty());
    let delivered = (symbols.unit_count(), dibits.unit_count());
    thread::sleep(Duration::from_millis(20));
    assert_eq!((symbols.unit_count(), dibits.unit_count()), delivered);
}

#[test]
fn test_stop_releases_listeners_and_refuses_registration() {
    let mut chain = attached_chain(Some(4));
    let binding = TapBinding::new(chain.modules());
    let tap = Tap::new("Demodulated", TapType::StreamFloat);
    let listener = Arc::new(CollectingListener::new());
    binding.select("fm", &tap, listener.clone()).unwrap();
    assert_eq!(Arc::strong_count(&listener), 2);

    run_to_exhaustion(&mut chain);
    assert_eq!(Arc::strong_count(&listener), 1);

    assert_eq!(
        binding.select("fm", &tap, listener.clone()),
        Err(TapError::Closed("fm".to_string()))
    );
    assert!(matches!(
        binding.select("c4fm", &Tap::new("Sync Event", TapType::EventSyncDetect), listener.clone()),
        Err(TapError::Closed(_))
    ));
    assert!(binding.selected().is_empty());
    assert_eq!(Arc::strong_count(&listener), 1);
}

#[test]
fn test_stop_before_start_closes_taps() {
    let mut chain = attached_chain(None);
    let binding = TapBinding::new(chain.modules());
    let tap = Tap::new("Symbol", TapType::StreamSymbol);
    binding
        .select("c4fm", &tap, Arc::new(CollectingListener::new()))
        .unwrap();

    chain.stop().unwrap();
    assert!(binding.selected().is_empty());
    assert!(binding
        .select("c4fm", &tap, Arc::new(CollectingListener::new()))
        .is_err());
}

#[test]
fn test_listener_can_deselect_itself_while_running() {
    let mut chain = attached_chain(None);
    let binding = Arc::new(TapBinding::new(chain.modules()));
    let tap = Tap::new("Demodulated", TapType::StreamFloat);
    let calls = Arc::new(AtomicUsize::new(0));

    let one_shot = {
        let binding = Arc::downgrade(&binding);
        let calls = Arc::clone(&calls);
        move |tap: &Tap, _: &TapPayload| -> anyhow::Result<()> {
            calls.fetch_add(1, Ordering::SeqCst);
            if let Some(binding) = binding.upgrade() {
                binding.deselect("fm", tap)?;
            }
            Ok(())
        }
    };
    binding.select("fm", &tap, Arc::new(one_shot)).unwrap();

    chain.start().unwrap();
    assert!(wait_until(Duration::from_secs(10), || chain.stats().buffers_processed > 20));
    assert!(chain.is_producing());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(!binding.is_selected("fm", &tap));
    chain.stop().unwrap();
}

#[test]
fn test_unregister_is_synchronous_while_running() {
    let mut chain = attached_chain(None);
    let binding = Arc::new(TapBinding::new(chain.modules()));
    chain.start().unwrap();

    let worker = {
        let binding = Arc::clone(&binding);
        thread::spawn(move || {
            let tap = Tap::new("Demodulated", TapType::StreamFloat);
            for _ in 0..25 {
                let listener = Arc::new(CollectingListener::new());
                binding.select("fm", &tap, listener.clone()).unwrap();
                thread::sleep(Duration::from_millis(1));
                binding.deselect("fm", &tap).unwrap();

                let after_unregister = listener.unit_count();
                thread::sleep(Duration::from_millis(2));
                assert_eq!(listener.unit_count(), after_unregister);
            }
        })
    };

    worker.join().unwrap();
    assert!(chain.is_producing());
    chain.stop().unwrap();
    assert!(binding.selected().is_empty());
}

#[test]
fn test_concurrent_selection_from_many_threads() {
    let mut chain = attached_chain(None);
    let binding = Arc::new(TapBinding::new(chain.modules()));
    chain.start().unwrap();

    let taps = [
        ("fm", Tap::new("Baseband", TapType::StreamComplexSample)),
        ("fm", Tap::new("Demodulated", TapType::StreamFloat)),
        ("c4fm", Tap::new("Symbol", TapType::StreamSymbol)),
        ("c4fm", Tap::new("Dibit Stream", TapType::StreamDibit)),
    ];
    let workers: Vec<_> = taps
        .into_iter()
        .map(|(module_id, tap)| {
            let binding = Arc::clone(&binding);
            thread::spawn(move || {
                for _ in 0..50 {
                    binding
                        .select(module_id, &tap, Arc::new(CollectingListener::new()))
                        .unwrap();
                    binding.deselect(module_id, &tap).unwrap();
                }
            })
        })
        .collect();

    for worker in workers {
        worker.join().unwrap();
    }
    assert!(binding.selected().is_empty());
    chain.stop().unwrap();
}

#[test]
fn test_rebinding_replaces_listener() {
    let mut chain = attached_chain(None);
    let binding = TapBinding::new(chain.modules());
    let tap = Tap::new("Demodulated", TapType::StreamFloat);
    let first = Arc::new(CollectingListener::new());
    let second = Arc::new(CollectingListener::new());

    binding.select("fm", &tap, first.clone()).unwrap();
    chain.start().unwrap();
    assert!(wait_until(Duration::from_secs(10), || first.unit_count() > 0));

    binding.select("fm", &tap, second.clone()).unwrap();
    let first_total = first.unit_count();
    assert!(wait_until(Duration::from_secs(10), || second.unit_count() > 0));
    chain.stop().unwrap();

    assert_eq!(first.unit_count(), first_total);
    assert_eq!(binding.selected(), Vec::new());
}

#[test]
fn test_panicking_tap_listener_does_not_stop_producer() {
    let mut chain = attached_chain(None);
    let binding = TapBinding::new(chain.modules());
    let exploding = |_: &Tap, _: &TapPayload| -> anyhow::Result<()> { panic!("viewer crashed") };
    let exploding: Arc<dyn TapListener> = Arc::new(exploding);
    binding
        .select("fm", &Tap::new("Demodulated", TapType::StreamFloat), exploding)
        .unwrap();

    chain.start().unwrap();
    assert!(wait_until(Duration::from_secs(10), || chain.stats().buffers_processed > 5));
    assert!(chain.is_producing());
    assert!(binding.is_selected("fm", &Tap::new("Demodulated", TapType::StreamFloat)));
    chain.stop().unwrap();
}

#[test]
fn test_drop_stops_running_chain() {
    let mut chain = attached_chain(None);
    let binding = TapBinding::new(chain.modules());
    binding
        .select("c4fm", &Tap::new("Symbol", TapType::StreamSymbol), Arc::new(CollectingListener::new()))
        .unwrap();
    chain.start().unwrap();
    drop(chain);
    assert!(binding.selected().is_empty());
}

struct FaultyModule;

impl Module for FaultyModule {
    fn id(&self) -> &str {
        "faulty"
    }

    fn name(&self) -> &'static str {
        "faulty"
    }

    fn receive(&self, _buffer: &SampleBuffer, _messages: &mut Vec<Message>) {
        panic!("module bug");
    }
}

fn faulty_chain() -> ProcessingChain {
    let mut chain = ProcessingChain::new();
    chain
        .add_modules(vec![Arc::new(FaultyModule) as Arc<dyn Module>])
        .unwrap();
    chain.set_source(source(SignalKind::Tone, None)).unwrap();
    chain
}

#[test]
fn test_module_panic_is_reported_by_stop() {
    let mut chain = faulty_chain();
    chain.start().unwrap();
    assert!(wait_until(Duration::from_secs(10), || !chain.is_producing()));

    match chain.stop() {
        Err(ChainError::ProducerPanicked(reason)) => assert!(reason.contains("module bug")),
        other => panic!("expected ProducerPanicked, got {:?}", other),
    }
    assert_eq!(chain.state(), ChainState::Stopped);
}

#[test]
fn test_drop_after_module_panic_does_not_propagate() {
    let mut chain = faulty_chain();
    chain.start().unwrap();
    assert!(wait_until(Duration::from_secs(10), || !chain.is_producing()));
    drop(chain);
}
