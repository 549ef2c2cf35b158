use std::borrow::Cow;

use colony::{Best, Contribution, DistanceMatrix, Params, RandomStream, Tour};
use comms::{
    MsgReceiver, MsgSender,
    msg::{Command, Msg, Payload},
};
use node::{
    Collective, Hub, NodeErr, RunPlan, Spoke, bootstrap,
    collective::Link,
};
use tokio::io::{self, DuplexStream, ReadHalf, WriteHalf};

type Rx = MsgReceiver<ReadHalf<DuplexStream>>;
type Tx = MsgSender<WriteHalf<DuplexStream>>;

fn channel_pair() -> ((Rx, Tx), (Rx, Tx)) {
    let (stream1, stream2) = io::duplex(4096);
    let (rx1, tx1) = io::split(stream1);
    let (rx2, tx2) = io::split(stream2);
    let chan1 = comms::channel(rx1, tx1);
    let chan2 = comms::channel(rx2, tx2);
    (chan1, chan2)
}

fn square() -> DistanceMatrix {
    #[rustfmt::skip]
    let values = vec![
        0, 1, 4, 3,
        1, 0, 2, 5,
        4, 2, 0, 1,
        3, 5, 1, 0,
    ];
    DistanceMatrix::from_flat(4, values).unwrap()
}

fn contribution(rank: usize, cities: &[usize], stagnation: u64) -> Contribution {
    let tour = Tour::from_cities(cities.to_vec(), 4).unwrap();

    Contribution {
        rank,
        trail: vec![0.1 * (rank + 1) as f64; 4],
        best: Some(Best::priced(tour, &square())),
        stagnation,
    }
}

#[tokio::test]
async fn member_receives_plan_and_instance() -> Result<(), NodeErr> {
    let ((hub_rx, hub_tx), (member_rx, member_tx)) = channel_pair();

    let params = Params::new(1.5, 0.5, 0.25).unwrap();
    let plan = RunPlan::new(3, 8, 4, 7, 2, params).unwrap();
    let distances = square();
    let stream = RandomStream::new(vec![9, 0, u64::MAX, 3, 3]).unwrap();

    let coordinator = bootstrap::enroll(2, hub_rx, hub_tx, &plan, &distances, &stream);
    let member = bootstrap::join(member_rx, member_tx);
    let (link, (enrollment, spoke)) = tokio::try_join!(coordinator, member)?;

    assert_eq!(link.peer(), 2);
    assert_eq!(enrollment.rank, 2);
    assert_eq!(enrollment.plan, plan);
    assert_eq!(enrollment.distances, distances);
    assert_eq!(enrollment.stream.values(), stream.values());
    assert_eq!(enrollment.stream.position(), 0);
    assert_eq!((spoke.rank(), spoke.size()), (2, 3));
    Ok(())
}

#[tokio::test]
async fn hub_relays_every_contribution_in_rank_order() -> Result<(), NodeErr> {
    let ((a_rx, a_tx), (one_rx, one_tx)) = channel_pair();
    let ((b_rx, b_tx), (two_rx, two_tx)) = channel_pair();

    let mut hub = Hub::new(4, vec![Link::new(1, a_rx, a_tx), Link::new(2, b_rx, b_tx)])?;
    let mut one = Spoke::new(1, 3, 4, Link::new(0, one_rx, one_tx));
    let mut two = Spoke::new(2, 3, 4, Link::new(0, two_rx, two_tx));

    let expected = vec![
        contribution(0, &[0, 1, 2, 3], 1),
        contribution(1, &[2, 1, 0, 3], 4),
        Contribution {
            rank: 2,
            best: None,
            stagnation: 6,
            trail: vec![],
        },
    ];

    let (at_hub, at_one, at_two) = tokio::try_join!(
        hub.all_gather(expected[0].clone()),
        one.all_gather(expected[1].clone()),
        two.all_gather(expected[2].clone()),
    )?;

    assert_eq!(at_hub, expected);
    assert_eq!(at_one, expected);
    assert_eq!(at_two, expected);
    Ok(())
}

#[tokio::test]
async fn final_tours_reach_the_coordinator_only() -> Result<(), NodeErr> {
    let ((hub_rx, hub_tx), (member_rx, member_tx)) = channel_pair();

    let mut hub = Hub::new(4, vec![Link::new(1, hub_rx, hub_tx)])?;
    let mut spoke = Spoke::new(1, 2, 4, Link::new(0, member_rx, member_tx));
    let tour = Tour::from_cities(vec![3, 1, 0, 2], 4).unwrap();

    let (at_hub, at_spoke) = tokio::try_join!(
        hub.gather_tours(None),
        spoke.gather_tours(Some(&tour)),
    )?;

    assert_eq!(at_hub, Some(vec![Some(tour)]));
    assert_eq!(at_spoke, None);

    tokio::try_join!(hub.close(), spoke.close())?;
    Ok(())
}

#[tokio::test]
async fn unexpected_message_is_fatal() {
    let ((_hub_rx, mut hub_tx), (member_rx, member_tx)) = channel_pair();
    let mut spoke = Spoke::new(1, 2, 4, Link::new(0, member_rx, member_tx));

    hub_tx
        .send(&Msg::Control(Command::Disconnect))
        .await
        .unwrap();

    let err = spoke
        .all_gather(contribution(1, &[0, 1, 2, 3], 0))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        NodeErr::UnexpectedMessage {
            phase: "all-gather standing",
            got: "control/disconnect",
        }
    ));
}

#[tokio::test]
async fn peer_failure_is_reported() {
    let ((_hub_rx, mut hub_tx), (member_rx, member_tx)) = channel_pair();
    let mut spoke = Spoke::new(1, 2, 4, Link::new(0, member_rx, member_tx));

    hub_tx
        .send(&Msg::Err(Cow::Borrowed("no next city")))
        .await
        .unwrap();

    let err = spoke.close().await.unwrap_err();
    assert!(matches!(err, NodeErr::Peer { rank: 0, detail } if detail == "no next city"));
}

#[tokio::test]
async fn contribution_from_the_wrong_rank_is_rejected() {
    let ((hub_rx, hub_tx), (member_rx, member_tx)) = channel_pair();
    let mut hub = Hub::new(4, vec![Link::new(1, hub_rx, hub_tx)]).unwrap();
    let mut member = Link::new(0, member_rx, member_tx);

    member
        .send_contribution(&contribution(5, &[0, 1, 2, 3], 0))
        .await
        .unwrap();

    let err = hub
        .all_gather(contribution(0, &[0, 1, 2, 3], 0))
        .await
        .unwrap_err();

    assert!(matches!(err, NodeErr::RankMismatch { expected: 1, got: 5 }));
}

#[tokio::test]
async fn short_trail_is_rejected() {
    let ((hub_rx, hub_tx), (_member_rx, mut member_tx)) = channel_pair();
    let mut hub = Link::new(1, hub_rx, hub_tx);

    let standing = Msg::Control(Command::Standing {
        rank: 1,
        cost: Some(7),
        stagnation: 0,
    });
    member_tx.send(&standing).await.unwrap();
    member_tx
        .send(&Msg::Data(Payload::Tour(&[0, 1, 2, 3])))
        .await
        .unwrap();
    member_tx
        .send(&Msg::Data(Payload::Trail(&[0.5, 0.5])))
        .await
        .unwrap();

    let err = hub.recv_contribution(1, 4).await.unwrap_err();
    assert!(matches!(
        err,
        NodeErr::PayloadLength {
            what: "trail",
            got: 2,
            expected: 4,
        }
    ));
}

#[tokio::test]
async fn wrong_distance_count_fails_the_join() {
    let ((mut hub_rx, mut hub_tx), (member_rx, member_tx)) = channel_pair();

    let coordinator = async move {
        let mut rx_buf: Vec<u64> = Vec::new();
        let Msg::Control(Command::Join) = hub_rx.recv_into(&mut rx_buf).await? else {
            panic!("expected join");
        };

        let params = Params::new(1.0, 1.0, 0.5).unwrap();
        let plan = RunPlan::new(2, 2, 4, 1, 1, params).unwrap();
        hub_tx
            .send(&Msg::Control(Command::Setup(plan.to_spec(1, 3))))
            .await?;
        hub_tx
            .send(&Msg::Data(Payload::Distances(&[0, 1, 1, 0])))
            .await?;

        Ok::<_, std::io::Error>(())
    };

    let (sent, joined) = tokio::join!(coordinator, bootstrap::join(member_rx, member_tx));
    sent.unwrap();

    assert!(matches!(
        joined,
        Err(NodeErr::PayloadLength {
            what: "distances",
            got: 4,
            expected: 16,
        })
    ));
}
