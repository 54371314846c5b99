use super::{VerificationType, WireType};
use crate::jvm::{BinaryName, Error, RefType, Serialize};
use byteorder::WriteBytesExt;
use std::io;

/// Frame with every stack and local entry spelled out, in the form used by the `StackMapTable`
/// (one entry per value, no fillers after `long`/`double`)
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WireFrame<V> {
    pub locals: Vec<V>,
    pub stack: Vec<V>,
}

/// Entry in the `StackMapTable`, encoded relative to the entry before it
///
/// See [the JVM specification][0] for the binary layout of each variant.
///
/// [0]: https://docs.oracle.com/javase/specs/jvms/se17/html/jvms-4.html#jvms-4.7.4
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StackMapFrame<V> {
    /// Frame has the same locals as the previous frame and number of stack items is zero
    /// Tags: 0-63 or 251
    SameLocalsNoStack { offset_delta: u16 },

    /// Frame has the same locals as the previous frame and number of stack items is one
    /// Tags: 64-127 or 247
    SameLocalsOneStack { offset_delta: u16, stack: V },

    /// Frame is like the previous frame, but without the last `chopped_k` locals
    ///
    /// Note: `chopped_k` must be in the range 1 to 3 inclusive
    /// Tags: 248-250
    ChopLocalsNoStack { offset_delta: u16, chopped_k: u8 },

    /// Frame is like the previous frame, but with extra locals
    /// Tags: 252-254
    AppendLocalsNoStack { offset_delta: u16, locals: Vec<V> },

    /// Frame has exactly the locals and stack specified
    /// Tag: 255
    Full {
        offset_delta: u16,
        locals: Vec<V>,
        stack: Vec<V>,
    },
}

impl<V: Clone + PartialEq> WireFrame<V> {
    /// Compute a stack map frame for this frame, given the previous frame
    ///
    /// This will fall back to the `Full` option only if none of the other stack map frame variants
    /// are enough to encode the transition.
    pub fn delta_from(&self, offset_delta: u16, previous_frame: &Self) -> StackMapFrame<V> {
        match self.stack.len() {
            0 => {
                let this_locals_len = self.locals.len();
                let prev_locals_len = previous_frame.locals.len();

                if this_locals_len <= prev_locals_len {
                    let len_difference = prev_locals_len - this_locals_len;
                    let this_is_prefix_of_prev = previous_frame.locals.starts_with(&self.locals);
                    if len_difference < 4 && this_is_prefix_of_prev {
                        if len_difference == 0 {
                            return StackMapFrame::SameLocalsNoStack { offset_delta };
                        } else {
                            return StackMapFrame::ChopLocalsNoStack {
                                offset_delta,
                                chopped_k: len_difference as u8,
                            };
                        }
                    }
                } else if this_locals_len - prev_locals_len < 4
                    && self.locals.starts_with(&previous_frame.locals)
                {
                    return StackMapFrame::AppendLocalsNoStack {
                        offset_delta,
                        locals: self.locals[prev_locals_len..].to_vec(),
                    };
                }
            }
            1 if self.locals == previous_frame.locals => {
                return StackMapFrame::SameLocalsOneStack {
                    offset_delta,
                    stack: self.stack[0].clone(),
                }
            }
            _ => (),
        }

        StackMapFrame::Full {
            offset_delta,
            locals: self.locals.clone(),
            stack: self.stack.clone(),
        }
    }
}

impl<V: Clone> StackMapFrame<V> {
    pub fn offset_delta(&self) -> u16 {
        match self {
            StackMapFrame::SameLocalsNoStack { offset_delta }
            | StackMapFrame::SameLocalsOneStack { offset_delta, .. }
            | StackMapFrame::ChopLocalsNoStack { offset_delta, .. }
            | StackMapFrame::AppendLocalsNoStack { offset_delta, .. }
            | StackMapFrame::Full { offset_delta, .. } => *offset_delta,
        }
    }

    /// Reconstruct the full frame from this entry and the frame before it
    pub fn expand(&self, previous_frame: &WireFrame<V>) -> WireFrame<V> {
        match self {
            StackMapFrame::SameLocalsNoStack { .. } => WireFrame {
                locals: previous_frame.locals.clone(),
                stack: vec![],
            },
            StackMapFrame::SameLocalsOneStack { stack, .. } => WireFrame {
                locals: previous_frame.locals.clone(),
                stack: vec![stack.clone()],
            },
            StackMapFrame::ChopLocalsNoStack { chopped_k, .. } => {
                let kept = previous_frame
                    .locals
                    .len()
                    .saturating_sub(*chopped_k as usize);
                WireFrame {
                    locals: previous_frame.locals[..kept].to_vec(),
                    stack: vec![],
                }
            }
            StackMapFrame::AppendLocalsNoStack { locals, .. } => WireFrame {
                locals: previous_frame
                    .locals
                    .iter()
                    .chain(locals)
                    .cloned()
                    .collect(),
                stack: vec![],
            },
            StackMapFrame::Full { locals, stack, .. } => WireFrame {
                locals: locals.clone(),
                stack: stack.clone(),
            },
        }
    }

    /// Like `VerificationType::try_map`, over every type in the frame
    pub fn try_map<V2, E>(
        &self,
        mut map_type: impl FnMut(&V) -> Result<V2, E>,
    ) -> Result<StackMapFrame<V2>, E> {
        Ok(match self {
            StackMapFrame::SameLocalsNoStack { offset_delta } => StackMapFrame::SameLocalsNoStack {
                offset_delta: *offset_delta,
            },
            StackMapFrame::SameLocalsOneStack {
                offset_delta,
                stack,
            } => StackMapFrame::SameLocalsOneStack {
                offset_delta: *offset_delta,
                stack: map_type(stack)?,
            },
            StackMapFrame::ChopLocalsNoStack {
                offset_delta,
                chopped_k,
            } => StackMapFrame::ChopLocalsNoStack {
                offset_delta: *offset_delta,
                chopped_k: *chopped_k,
            },
            StackMapFrame::AppendLocalsNoStack {
                offset_delta,
                locals,
            } => StackMapFrame::AppendLocalsNoStack {
                offset_delta: *offset_delta,
                locals: locals.iter().map(&mut map_type).collect::<Result<_, _>>()?,
            },
            StackMapFrame::Full {
                offset_delta,
                locals,
                stack,
            } => StackMapFrame::Full {
                offset_delta: *offset_delta,
                locals: locals.iter().map(&mut map_type).collect::<Result<_, _>>()?,
                stack: stack.iter().map(&mut map_type).collect::<Result<_, _>>()?,
            },
        })
    }
}

/// Delta-encode frames (sorted by offset) into `StackMapTable` entries
///
/// The first entry is encoded against `initial` (the frame the JVM derives from the method
/// descriptor) and its offset delta is its offset. Every later entry is encoded against the entry
/// before it, with an offset delta of one less than the distance between them.
pub fn encode_frames<V: Clone + PartialEq>(
    initial: &WireFrame<V>,
    frames: &[(usize, WireFrame<V>)],
) -> Result<Vec<StackMapFrame<V>>, Error> {
    let mut encoded = Vec::with_capacity(frames.len());
    let mut previous: Option<(usize, &WireFrame<V>)> = None;

    for (offset, frame) in frames {
        let offset = *offset;
        let (delta, previous_frame) = match previous {
            None => (offset, initial),
            Some((previous_offset, _)) if offset <= previous_offset => {
                log::error!("Frames at {} and {} are out of order", previous_offset, offset);
                return Err(Error::ConflictingFrames { offset });
            }
            Some((previous_offset, previous_frame)) => (offset - previous_offset - 1, previous_frame),
        };
        let offset_delta =
            u16::try_from(delta).map_err(|_| Error::OffsetDeltaOverflow { offset })?;
        encoded.push(frame.delta_from(offset_delta, previous_frame));
        previous = Some((offset, frame));
    }

    Ok(encoded)
}

/// Undo `encode_frames`, recovering the offset and full frame of every entry
pub fn decode_frames<V: Clone>(
    initial: &WireFrame<V>,
    entries: &[StackMapFrame<V>],
) -> Vec<(usize, WireFrame<V>)> {
    let mut decoded: Vec<(usize, WireFrame<V>)> = Vec::with_capacity(entries.len());
    for entry in entries {
        let delta = entry.offset_delta() as usize;
        let (offset, frame) = match decoded.last() {
            None => (delta, entry.expand(initial)),
            Some((previous_offset, previous_frame)) => {
                (previous_offset + delta + 1, entry.expand(previous_frame))
            }
        };
        decoded.push((offset, frame));
    }
    decoded
}

/// Source of constant pool indices for the classes mentioned in frames
pub trait ClassIndexer {
    fn class_index(&mut self, class: &RefType<BinaryName>) -> Result<u16, Error>;
}

/// Write out the body of a `StackMapTable` attribute (entry count, then entries)
pub fn serialize_stack_map_table<I: ClassIndexer, W: WriteBytesExt>(
    entries: &[StackMapFrame<WireType>],
    indexer: &mut I,
    writer: &mut W,
) -> Result<(), Error> {
    let indexed: Vec<StackMapFrame<VerificationType<u16, u16>>> = entries
        .iter()
        .map(|entry| {
            entry.try_map(|vtype| vtype.try_map(|cls| indexer.class_index(cls), |off| Ok(*off)))
        })
        .collect::<Result<_, Error>>()?;
    indexed.serialize(writer)?;
    Ok(())
}

fn invalid_frame(message: &str) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, message)
}

impl Serialize for StackMapFrame<VerificationType<u16, u16>> {
    fn serialize<W: WriteBytesExt>(&self, writer: &mut W) -> io::Result<()> {
        match self {
            // `same_frame` and `same_frame_extended`
            StackMapFrame::SameLocalsNoStack { offset_delta } => {
                if *offset_delta <= 63 {
                    (*offset_delta as u8).serialize(writer)?;
                } else {
                    251u8.serialize(writer)?;
                    offset_delta.serialize(writer)?;
                }
            }

            // `same_locals_1_stack_item_frame` and `same_locals_1_stack_item_frame_extended`
            StackMapFrame::SameLocalsOneStack {
                offset_delta,
                stack,
            } => {
                if *offset_delta <= 63 {
                    (*offset_delta as u8 + 64).serialize(writer)?;
                } else {
                    247u8.serialize(writer)?;
                    offset_delta.serialize(writer)?;
                }
                stack.serialize(writer)?;
            }

            // `chop_frame`
            StackMapFrame::ChopLocalsNoStack {
                offset_delta,
                chopped_k,
            } => {
                if !(1..4).contains(chopped_k) {
                    return Err(invalid_frame("chop frames remove 1-3 locals"));
                }
                (251 - chopped_k).serialize(writer)?;
                offset_delta.serialize(writer)?;
            }

            // `append_frame`
            StackMapFrame::AppendLocalsNoStack {
                offset_delta,
                locals,
            } => {
                let added_k = locals.len();
                if !(1..4).contains(&added_k) {
                    return Err(invalid_frame("append frames add 1-3 locals"));
                }
                (251 + added_k as u8).serialize(writer)?;
                offset_delta.serialize(writer)?;
                for local in locals {
                    local.serialize(writer)?;
                }
            }

            // `full_frame`
            StackMapFrame::Full {
                offset_delta,
                locals,
                stack,
            } => {
                255u8.serialize(writer)?;
                offset_delta.serialize(writer)?;
                locals.serialize(writer)?;
                stack.serialize(writer)?;
            }
        };
        Ok(())
    }
}
