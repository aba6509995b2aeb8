//! Serial transport for the hand.
//!
//! Pose commands are written best-effort: a failed write is logged and
//! dropped so the game loop never stalls on the hand. The explicit setters
//! ([`HandSerial::set_goal`], [`HandSerial::set_speed`], ...) used by the
//! bring-up tool return errors instead.

use std::io::{BufRead, BufReader, ErrorKind, Read, Write};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use serialport::SerialPort;
use tracing::{debug, info, trace, warn};

use super::protocol::{HandCommand, MotorTarget, Query, RunState, StatusLine};
use super::{HandError, FULL_CURL_STEPS, MAX_FINGER_SPEED};
use shared::hand_interface::{Finger, HandActuator};

/// Read timeout of the status reader; it only bounds how often the thread
/// wakes up.
const READ_TIMEOUT: Duration = Duration::from_millis(100);

/// Hand driver writing protocol lines to `W`.
pub struct HandSerial<W: Write> {
    writer: W,
    bob_curled: bool,
}

impl HandSerial<Box<dyn SerialPort>> {
    /// Open the hand's serial port and start logging its status replies.
    ///
    /// # Arguments
    /// * `path` - Serial device, e.g. `/dev/ttyUSB0`
    /// * `baud_rate` - Normally [`super::DEFAULT_BAUD_RATE`]
    pub fn open(path: &str, baud_rate: u32) -> Result<Self, HandError> {
        debug!("Opening hand on {} at {} baud", path, baud_rate);
        let port = serialport::new(path, baud_rate)
            .timeout(READ_TIMEOUT)
            .open()?;

        let reader = port.try_clone()?;
        spawn_status_reader(reader);

        info!("Connected to hand on {}", path);
        Ok(Self::new(port))
    }
}

impl<W: Write> HandSerial<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            bob_curled: false,
        }
    }

    /// Write one command and flush.
    pub fn send(&mut self, command: &HandCommand) -> Result<(), HandError> {
        debug!("Hand command {:?}", command);
        self.send_raw(&command.encode())
    }

    /// Write a raw protocol line, appending the newline if missing.
    pub fn send_raw(&mut self, line: &str) -> Result<(), HandError> {
        trace!("Sending to hand: {:?}", line);
        self.writer.write_all(line.as_bytes())?;
        if !line.ends_with('\n') {
            self.writer.write_all(b"\n")?;
        }
        self.writer.flush()?;
        Ok(())
    }

    fn send_best_effort(&mut self, command: HandCommand) {
        if let Err(e) = self.send(&command) {
            warn!("Dropped hand command {:?}: {}", command, e);
        }
    }

    /// Queue a goal for one finger (or all of them).
    ///
    /// # Arguments
    /// * `finger` - `None` addresses every finger
    /// * `fraction` - 0.0 is fully open, 1.0 fully curled
    pub fn set_goal(&mut self, finger: Option<Finger>, fraction: f64) -> Result<(), HandError> {
        if !(0.0..=1.0).contains(&fraction) {
            return Err(HandError::GoalOutOfRange(fraction));
        }
        self.send(&HandCommand::Goal {
            target: finger.into(),
            steps: (fraction * FULL_CURL_STEPS as f64).round() as i32,
        })
    }

    /// Set the maximum speed in full travels per second.
    pub fn set_speed(
        &mut self,
        finger: Option<Finger>,
        travels_per_sec: f64,
    ) -> Result<(), HandError> {
        if !(travels_per_sec > 0.0 && travels_per_sec <= MAX_FINGER_SPEED) {
            return Err(HandError::SpeedOutOfRange(travels_per_sec));
        }
        self.send(&HandCommand::Speed {
            target: finger.into(),
            steps_per_sec: travels_per_sec * FULL_CURL_STEPS as f64,
        })
    }

    /// Start (or halt) the queued moves on every finger.
    pub fn set_running(&mut self, run: RunState) -> Result<(), HandError> {
        self.send(&HandCommand::State {
            target: MotorTarget::All,
            run,
        })
    }

    /// Declare the current finger positions to be fully open.
    pub fn zero(&mut self) -> Result<(), HandError> {
        self.send(&HandCommand::Zero)
    }

    /// Ask the board to report a value; replies arrive on the status reader.
    pub fn query(&mut self, finger: Option<Finger>, query: Query) -> Result<(), HandError> {
        self.send(&HandCommand::Get {
            target: finger.into(),
            query,
        })
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> HandActuator for HandSerial<W> {
    fn extend(&mut self, finger: Finger) {
        self.send_best_effort(HandCommand::Goal {
            target: finger.into(),
            steps: 0,
        });
    }

    fn retract(&mut self, finger: Finger) {
        self.send_best_effort(HandCommand::Goal {
            target: finger.into(),
            steps: FULL_CURL_STEPS,
        });
    }

    fn trigger_movement(&mut self) {
        self.send_best_effort(HandCommand::State {
            target: MotorTarget::All,
            run: RunState::Move,
        });
    }

    /// Alternate between a half curl and an open hand.
    fn idle_bob(&mut self) {
        self.bob_curled = !self.bob_curled;
        let steps = if self.bob_curled { FULL_CURL_STEPS / 2 } else { 0 };
        self.send_best_effort(HandCommand::Goal {
            target: MotorTarget::All,
            steps,
        });
        self.trigger_movement();
    }

    fn reset(&mut self) {
        self.bob_curled = false;
        self.paper();
    }
}

/// Read status lines from `reader` until it closes, handing each to `sink`.
///
/// Read timeouts are retried, so this only returns on end of stream or a
/// hard IO error. Blank lines are skipped; anything else that fails to parse
/// reaches `sink` as an error.
pub fn read_status_lines<R, F>(reader: R, mut sink: F) -> Result<(), HandError>
where
    R: Read,
    F: FnMut(Result<StatusLine, HandError>),
{
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();

    loop {
        match reader.read_until(b'\n', &mut buf) {
            Ok(0) => return Ok(()),
            Ok(_) if buf.ends_with(b"\n") => {
                let line = String::from_utf8_lossy(&buf);
                if !line.trim().is_empty() {
                    sink(line.parse::<StatusLine>());
                }
                buf.clear();
            }
            // unterminated tail, the next read reports end of stream
            Ok(_) => continue,
            Err(e)
                if matches!(
                    e.kind(),
                    ErrorKind::TimedOut | ErrorKind::WouldBlock | ErrorKind::Interrupted
                ) =>
            {
                continue
            }
            Err(e) => return Err(e.into()),
        }
    }
}

/// Log everything the hand reports on a background thread.
pub fn spawn_status_reader<R: Read + Send + 'static>(reader: R) -> JoinHandle<()> {
    thread::spawn(move || {
        let result = read_status_lines(reader, |status| match status {
            Ok(line) => info!("Motor {} {}: {}", line.motor, line.field, line.value),
            Err(e) => debug!("{}", e),
        });

        match result {
            Ok(()) => debug!("Hand status stream closed"),
            Err(e) => warn!("Hand status reader stopped: {}", e),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hand::StatusField;
    use std::io::{self, Cursor};

    fn sent(hand: HandSerial<Vec<u8>>) -> String {
        String::from_utf8(hand.into_inner()).unwrap()
    }

    #[test]
    fn test_primitives() {
        let mut hand = HandSerial::new(Vec::new());
        hand.extend(Finger::Index);
        hand.retract(Finger::Ring);
        hand.trigger_movement();
        assert_eq!(sent(hand), "1|GOAL: 0\n3|GOAL: 2000\nA|STATE: MOVE\n");
    }

    #[test]
    fn test_scissors_pose() {
        let mut hand = HandSerial::new(Vec::new());
        hand.scissors();
        assert_eq!(
            sent(hand),
            "1|GOAL: 0\n2|GOAL: 0\n3|GOAL: 2000\n4|GOAL: 2000\nA|STATE: MOVE\n"
        );
    }

    #[test]
    fn test_idle_bob_alternates() {
        let mut hand = HandSerial::new(Vec::new());
        hand.idle_bob();
        hand.idle_bob();
        assert_eq!(
            sent(hand),
            "A|GOAL: 1000\nA|STATE: MOVE\nA|GOAL: 0\nA|STATE: MOVE\n"
        );
    }

    #[test]
    fn test_set_goal_validates() {
        let mut hand = HandSerial::new(Vec::new());
        assert!(matches!(
            hand.set_goal(None, 1.5),
            Err(HandError::GoalOutOfRange(_))
        ));
        hand.set_goal(Some(Finger::Middle), 0.25).unwrap();
        assert_eq!(sent(hand), "2|GOAL: 500\n");
    }

    #[test]
    fn test_set_speed_validates() {
        let mut hand = HandSerial::new(Vec::new());
        for bad in [0.0, -1.0, 4.5, f64::NAN] {
            assert!(matches!(
                hand.set_speed(None, bad),
                Err(HandError::SpeedOutOfRange(_))
            ));
        }
        hand.set_speed(None, 4.0).unwrap();
        hand.set_speed(Some(Finger::Pinky), 0.3).unwrap();
        assert_eq!(sent(hand), "A|SPEED: 8000.0\n4|SPEED: 600.0\n");
    }

    #[test]
    fn test_send_raw_appends_newline() {
        let mut hand = HandSerial::new(Vec::new());
        hand.send_raw("1|GET: POS").unwrap();
        hand.send_raw("A|ZERO: \n").unwrap();
        assert_eq!(sent(hand), "1|GET: POS\nA|ZERO: \n");
    }

    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(ErrorKind::BrokenPipe, "unplugged"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_pose_writes_are_best_effort() {
        let mut hand = HandSerial::new(BrokenPipe);
        hand.rock();
        hand.reset();
        assert!(matches!(hand.zero(), Err(HandError::Io(_))));
    }

    #[test]
    fn test_read_status_lines() {
        let input = Cursor::new("S1 Goal: 2000\r\n\nS2 Running: 1\ngarbage\nS4 Pos: 12");
        let mut parsed = Vec::new();
        let mut errors = 0;

        read_status_lines(input, |status| match status {
            Ok(line) => parsed.push(line),
            Err(_) => errors += 1,
        })
        .unwrap();

        // trailing line without newline is never completed
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].field, StatusField::Goal);
        assert_eq!(parsed[1].motor, 2);
        assert_eq!(errors, 1);
    }
}
