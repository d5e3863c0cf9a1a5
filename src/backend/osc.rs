//! OSC decoding of VMC bone pose messages
//!
//! A bone pose message carries `[name: string, px, py, pz, qx, qy, qz, qw]`.
//! Arguments past the eighth are ignored. Numeric arguments may be sent as
//! `Float` or `Double`. Bundles are flattened so every message inside them is
//! considered.

use crate::error::{Result, RetargetError};
use crate::types::BoneSample;
use rosc::{decoder, encoder, OscMessage, OscPacket, OscType};

/// Largest datagram the receiver reads
pub const MAX_PACKET_SIZE: usize = decoder::MTU;

/// Arguments in a bone pose message
const BONE_ARG_COUNT: usize = 8;

/// Everything extracted from one UDP datagram
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecodedPacket {
    /// Well-formed bone samples in packet order
    pub samples: Vec<BoneSample>,
    /// Bone messages dropped for a bad payload
    pub malformed: usize,
    /// Messages at other addresses
    pub ignored: usize,
}

/// Decode a datagram and pull out every bone sample sent to `bone_address`.
///
/// Fails only when the datagram is not OSC at all; bad bone payloads are
/// counted in [`DecodedPacket::malformed`].
pub fn decode_packet(buf: &[u8], bone_address: &str) -> Result<DecodedPacket> {
    let (_, packet) = decoder::decode_udp(buf)?;
    let mut decoded = DecodedPacket::default();
    collect(packet, bone_address, &mut decoded);
    Ok(decoded)
}

fn collect(packet: OscPacket, bone_address: &str, out: &mut DecodedPacket) {
    match packet {
        OscPacket::Message(msg) => {
            if msg.addr != bone_address {
                out.ignored += 1;
                return;
            }
            match decode_bone_message(&msg) {
                Ok(sample) => out.samples.push(sample),
                Err(e) => {
                    tracing::trace!("Dropping bone message: {}", e);
                    out.malformed += 1;
                }
            }
        }
        OscPacket::Bundle(bundle) => {
            for inner in bundle.content {
                collect(inner, bone_address, out);
            }
        }
    }
}

/// Turn a bone pose message into a sample. The address is not checked.
pub fn decode_bone_message(msg: &OscMessage) -> Result<BoneSample> {
    if msg.args.len() < BONE_ARG_COUNT {
        return Err(RetargetError::malformed(
            &msg.addr,
            format!("expected {} arguments, got {}", BONE_ARG_COUNT, msg.args.len()),
        ));
    }

    let bone_id = match &msg.args[0] {
        OscType::String(name) if !name.is_empty() => name.clone(),
        OscType::String(_) => return Err(RetargetError::malformed(&msg.addr, "empty bone name")),
        other => {
            return Err(RetargetError::malformed(
                &msg.addr,
                format!("bone name must be a string, got {:?}", other),
            ))
        }
    };

    let mut values = [0.0f64; BONE_ARG_COUNT - 1];
    for (i, (slot, arg)) in values.iter_mut().zip(&msg.args[1..BONE_ARG_COUNT]).enumerate() {
        *slot = arg_as_f64(arg).ok_or_else(|| {
            RetargetError::malformed(
                &msg.addr,
                format!("argument {} must be a float, got {:?}", i + 1, arg),
            )
        })?;
    }

    let [px, py, pz, qx, qy, qz, qw] = values;
    Ok(BoneSample::new(bone_id, [px, py, pz], [qx, qy, qz, qw]))
}

fn arg_as_f64(arg: &OscType) -> Option<f64> {
    match arg {
        OscType::Float(v) => Some(f64::from(*v)),
        OscType::Double(v) => Some(*v),
        _ => None,
    }
}

/// Build the pose message a VMC sender would emit for `sample`
pub fn bone_message(address: &str, sample: &BoneSample) -> OscMessage {
    let [px, py, pz] = sample.position;
    let [qx, qy, qz, qw] = sample.rotation;
    OscMessage {
        addr: address.to_string(),
        args: vec![
            OscType::String(sample.bone_id.clone()),
            OscType::Float(px as f32),
            OscType::Float(py as f32),
            OscType::Float(pz as f32),
            OscType::Float(qx as f32),
            OscType::Float(qy as f32),
            OscType::Float(qz as f32),
            OscType::Float(qw as f32),
        ],
    }
}

/// Encode a packet into datagram bytes
pub fn encode_packet(packet: &OscPacket) -> Result<Vec<u8>> {
    Ok(encoder::encode(packet)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rosc::{OscBundle, OscTime};

    const ADDR: &str = "/VMC/Ext/Bone/Pos";

    fn encode_msg(msg: OscMessage) -> Vec<u8> {
        encode_packet(&OscPacket::Message(msg)).unwrap()
    }

    #[test]
    fn test_decode_well_formed() {
        let sample = BoneSample::new("Hips", [0.0, 1.0, 0.5], [0.0, 0.0, 0.0, 1.0]);
        let buf = encode_msg(bone_message(ADDR, &sample));

        let decoded = decode_packet(&buf, ADDR).unwrap();
        assert_eq!(decoded.samples, vec![sample]);
        assert_eq!(decoded.malformed, 0);
        assert_eq!(decoded.ignored, 0);
    }

    #[test]
    fn test_double_arguments_accepted() {
        let mut args = vec![OscType::String("Head".to_string())];
        args.extend([0.1, 0.2, 0.3, 0.0, 0.0, 0.0, 1.0].map(OscType::Double));
        let msg = OscMessage {
            addr: ADDR.to_string(),
            args,
        };
        let sample = decode_bone_message(&msg).unwrap();
        assert_eq!(sample.position, [0.1, 0.2, 0.3]);
    }

    #[test]
    fn test_extra_arguments_ignored() {
        let mut msg = bone_message(ADDR, &BoneSample::identity("Neck"));
        msg.args.push(OscType::Int(7));
        assert_eq!(decode_bone_message(&msg).unwrap().bone_id, "Neck");
    }

    #[test]
    fn test_short_message_is_malformed() {
        let mut msg = bone_message(ADDR, &BoneSample::identity("Hips"));
        msg.args.truncate(3);
        let err = decode_bone_message(&msg).unwrap_err();
        assert!(err.to_string().contains("got 3"));

        let decoded = decode_packet(&encode_msg(msg), ADDR).unwrap();
        assert!(decoded.samples.is_empty());
        assert_eq!(decoded.malformed, 1);
    }

    #[test]
    fn test_mistyped_arguments_are_malformed() {
        let mut msg = bone_message(ADDR, &BoneSample::identity("Hips"));
        msg.args[0] = OscType::Int(1);
        assert!(matches!(
            decode_bone_message(&msg),
            Err(RetargetError::MalformedMessage { .. })
        ));

        let mut msg = bone_message(ADDR, &BoneSample::identity("Hips"));
        msg.args[5] = OscType::String("x".to_string());
        let err = decode_bone_message(&msg).unwrap_err();
        assert!(err.to_string().contains("argument 5"));

        let mut msg = bone_message(ADDR, &BoneSample::identity("Hips"));
        msg.args[0] = OscType::String(String::new());
        assert!(decode_bone_message(&msg).is_err());
    }

    #[test]
    fn test_other_addresses_ignored() {
        let msg = OscMessage {
            addr: "/VMC/Ext/Root/Pos".to_string(),
            args: vec![OscType::String("root".to_string())],
        };
        let decoded = decode_packet(&encode_msg(msg), ADDR).unwrap();
        assert!(decoded.samples.is_empty());
        assert_eq!(decoded.ignored, 1);
        assert_eq!(decoded.malformed, 0);
    }

    #[test]
    fn test_nested_bundles_flattened() {
        let hips = bone_message(ADDR, &BoneSample::identity("Hips"));
        let spine = bone_message(ADDR, &BoneSample::identity("Spine"));
        let mut broken = bone_message(ADDR, &BoneSample::identity("Chest"));
        broken.args.pop();

        let inner = OscBundle {
            timetag: OscTime::from((0, 1)),
            content: vec![OscPacket::Message(spine), OscPacket::Message(broken)],
        };
        let outer = OscPacket::Bundle(OscBundle {
            timetag: OscTime::from((0, 1)),
            content: vec![
                OscPacket::Message(hips),
                OscPacket::Bundle(inner),
                OscPacket::Message(OscMessage {
                    addr: "/VMC/Ext/OK".to_string(),
                    args: vec![OscType::Int(1)],
                }),
            ],
        });

        let decoded = decode_packet(&encode_packet(&outer).unwrap(), ADDR).unwrap();
        let names: Vec<_> = decoded.samples.iter().map(|s| s.bone_id.as_str()).collect();
        assert_eq!(names, vec!["Hips", "Spine"]);
        assert_eq!(decoded.malformed, 1);
        assert_eq!(decoded.ignored, 1);
    }

    #[test]
    fn test_garbage_is_decode_error() {
        assert!(matches!(
            decode_packet(b"not osc", ADDR),
            Err(RetargetError::Osc(_))
        ));
    }
}
