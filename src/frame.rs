use crate::canvas::Canvas;
use crate::flowable::{BreakInside, Flowable};
use crate::types::{Pt, Rect};

pub enum AddResult {
    Placed,
    Split(Box<dyn Flowable>),
    Overflow(Box<dyn Flowable>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameState {
    Empty,
    Accumulating,
    Full,
}

/// One page's body region with a downward-advancing cursor. Placement is
/// two-phase: measure the block against the remaining height, then either
/// place it, place a leading split, or hand it back as overflow.
pub struct Frame {
    rect: Rect,
    cursor_y: Pt,
}

impl Frame {
    pub fn new(rect: Rect) -> Self {
        Self {
            rect,
            cursor_y: Pt::ZERO,
        }
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }

    pub fn remaining_height(&self) -> Pt {
        (self.rect.height - self.cursor_y).max(Pt::ZERO)
    }

    pub fn is_empty(&self) -> bool {
        self.cursor_y <= Pt::ZERO
    }

    pub fn state(&self) -> FrameState {
        if self.is_empty() {
            FrameState::Empty
        } else if self.remaining_height() <= Pt::ZERO {
            FrameState::Full
        } else {
            FrameState::Accumulating
        }
    }

    /// The overflow predicate evaluated before every placement.
    pub fn would_overflow(&self, block_height: Pt) -> bool {
        block_height > self.remaining_height()
    }

    pub fn add(&mut self, flowable: Box<dyn Flowable>, canvas: &mut Canvas) -> AddResult {
        let avail_width = self.rect.width;
        let avail_height = self.remaining_height();
        if self.state() == FrameState::Full {
            return AddResult::Overflow(flowable);
        }

        let pagination = flowable.pagination();
        let size = flowable.wrap(avail_width, avail_height);

        if matches!(pagination.break_inside, BreakInside::Avoid)
            && self.would_overflow(size.height)
            && size.height <= self.rect.height
            && !self.is_empty()
        {
            return AddResult::Overflow(flowable);
        }

        if !self.would_overflow(size.height) {
            self.place(flowable.as_ref(), canvas, size.height, avail_width, avail_height);
            return AddResult::Placed;
        }

        if let Some((first, second)) = flowable.split(avail_width, avail_height) {
            let first_size = first.wrap(avail_width, avail_height);
            if first_size.height > Pt::ZERO && !self.would_overflow(first_size.height) {
                self.place(
                    first.as_ref(),
                    canvas,
                    first_size.height,
                    avail_width,
                    avail_height,
                );
                return AddResult::Split(second);
            }
        }

        // A block taller than the whole frame that cannot split is placed on
        // an empty frame rather than bouncing between pages forever.
        if self.is_empty() {
            self.place(flowable.as_ref(), canvas, self.rect.height, avail_width, avail_height);
            return AddResult::Placed;
        }

        AddResult::Overflow(flowable)
    }

    fn place(
        &mut self,
        flowable: &dyn Flowable,
        canvas: &mut Canvas,
        height: Pt,
        avail_width: Pt,
        avail_height: Pt,
    ) {
        flowable.draw(
            canvas,
            self.rect.x,
            self.rect.y + self.cursor_y,
            avail_width,
            avail_height,
        );
        self.cursor_y += height;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flowable::Spacer;
    use crate::types::Size;

    fn frame(height: f32) -> Frame {
        Frame::new(Rect {
            x: Pt::ZERO,
            y: Pt::ZERO,
            width: Pt::from_f32(500.0),
            height: Pt::from_f32(height),
        })
    }

    #[test]
    fn state_progresses_empty_accumulating_full() {
        let mut frame = frame(100.0);
        let mut canvas = Canvas::new(Size::a4());
        assert_eq!(frame.state(), FrameState::Empty);

        match frame.add(Box::new(Spacer::new(60.0)), &mut canvas) {
            AddResult::Placed => {}
            _ => panic!("spacer should place"),
        }
        assert_eq!(frame.state(), FrameState::Accumulating);

        match frame.add(Box::new(Spacer::new(40.0)), &mut canvas) {
            AddResult::Placed => {}
            _ => panic!("second spacer should place"),
        }
        assert_eq!(frame.state(), FrameState::Full);
    }

    #[test]
    fn overflow_predicate_gates_placement() {
        let mut frame = frame(100.0);
        let mut canvas = Canvas::new(Size::a4());
        frame
            .add(Box::new(Spacer::new(70.0)), &mut canvas)
            .placed_or_panic();
        assert!(frame.would_overflow(Pt::from_f32(31.0)));
        assert!(!frame.would_overflow(Pt::from_f32(30.0)));

        match frame.add(Box::new(Spacer::new(31.0)), &mut canvas) {
            AddResult::Overflow(_) => {}
            _ => panic!("unsplittable overflow must hand the block back"),
        }
    }

    #[test]
    fn oversized_block_fills_an_empty_frame() {
        let mut frame = frame(100.0);
        let mut canvas = Canvas::new(Size::a4());
        match frame.add(Box::new(Spacer::new(400.0)), &mut canvas) {
            AddResult::Placed => {}
            _ => panic!("oversized block must land on the empty frame"),
        }
        assert_eq!(frame.state(), FrameState::Full);
    }

    impl AddResult {
        fn placed_or_panic(self) {
            match self {
                AddResult::Placed => {}
                AddResult::Split(_) => panic!("unexpected split"),
                AddResult::Overflow(_) => panic!("unexpected overflow"),
            }
        }
    }
}
